use pursuit_core::{
    Chronicle, ChronicleValidationError, Confirmation, DeadlineMark, Identity, PresenceReport,
    PriorityWeight, VisionText,
};

#[test]
fn chronicle_serialization_uses_expected_wire_fields() {
    let chronicle = Chronicle::with_state(VisionText::new("Run a marathon").unwrap(), true);

    let json = serde_json::to_value(&chronicle).unwrap();
    assert_eq!(json["vision"], "Run a marathon");
    assert_eq!(json["fulfilled"], true);

    let decoded: Chronicle = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, chronicle);
}

#[test]
fn chronicle_deserialization_revalidates_vision_text() {
    let empty = serde_json::json!({ "vision": "", "fulfilled": false });
    assert!(serde_json::from_value::<Chronicle>(empty).is_err());

    let oversize = serde_json::json!({ "vision": "v".repeat(101), "fulfilled": false });
    assert!(serde_json::from_value::<Chronicle>(oversize).is_err());
}

#[test]
fn priority_weight_serializes_as_level() {
    assert_eq!(serde_json::to_value(PriorityWeight::High).unwrap(), 3);
    let decoded: PriorityWeight = serde_json::from_value(serde_json::json!(1)).unwrap();
    assert_eq!(decoded, PriorityWeight::Low);
    assert!(serde_json::from_value::<PriorityWeight>(serde_json::json!(0)).is_err());
}

#[test]
fn presence_report_and_deadline_wire_fields() {
    let report = PresenceReport {
        present: true,
        description_length: 24,
        completion_achieved: true,
    };
    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["present"], true);
    assert_eq!(json["description_length"], 24);
    assert_eq!(json["completion_achieved"], true);

    let mark = serde_json::to_value(DeadlineMark::new(1_050)).unwrap();
    assert_eq!(mark["target_height"], 1_050);
    assert_eq!(mark["alert_processed"], false);
}

#[test]
fn confirmation_serializes_in_snake_case() {
    assert_eq!(
        serde_json::to_value(Confirmation::DeadlineEstablished).unwrap(),
        "deadline_established"
    );
}

#[test]
fn identity_round_trips_as_plain_string_and_validates() {
    let identity = Identity::new("alice.pursuits").unwrap();
    assert_eq!(serde_json::to_value(&identity).unwrap(), "alice.pursuits");

    let err = serde_json::from_value::<Identity>(serde_json::json!("has space")).unwrap_err();
    assert!(err.to_string().contains("invalid identity handle"));
}

#[test]
fn validation_errors_render_readable_messages() {
    let err = VisionText::new("x".repeat(120)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "vision text has 120 characters; capacity is 100"
    );
    assert_eq!(
        ChronicleValidationError::WeightOutOfRange(9).to_string(),
        "priority level 9 is outside the range 1..=3"
    );
}
