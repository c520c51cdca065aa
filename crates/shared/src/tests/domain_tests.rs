use super::*;

#[test]
fn accepts_basic_email_shapes() {
    for email in [
        "a@b.co",
        "ada@example.com",
        "ADA@Example.com ",
        "  first.last+tag@sub.domain.io",
        "contact me at bob@mail.org please",
    ] {
        assert!(looks_like_email(email), "expected match for {email:?}");
    }
}

#[test]
fn rejects_inputs_without_local_domain_and_tld() {
    for email in [
        "",
        "   ",
        "plainaddress",
        "@example.com",
        "ada@",
        "ada@example",
        "ada@example.",
        "ada@.com",
        "ada @example.com",
        "ada@ example.com",
        "ada@exa mple.com",
    ] {
        assert!(!looks_like_email(email), "expected no match for {email:?}");
    }
}

#[test]
fn normalizes_entry_on_successful_validation() {
    let fields = WaitlistFields::new("Ada", "ADA@Example.com ", UserType::Business);
    let entry = fields.validate().expect("valid");

    assert_eq!(entry.name(), "Ada");
    assert_eq!(entry.email(), "ada@example.com");
    assert_eq!(entry.user_type(), UserType::Business);
}

#[test]
fn trims_name_before_persisting() {
    let fields = WaitlistFields::new("  Grace Hopper\t", "grace@navy.mil", UserType::Individual);
    let entry = fields.validate().expect("valid");
    assert_eq!(entry.name(), "Grace Hopper");
}

#[test]
fn whitespace_only_name_is_missing() {
    for name in ["", " ", "\t\n"] {
        let fields = WaitlistFields::new(name, "a@b.com", UserType::Individual);
        assert_eq!(fields.validate(), Err(ValidationError::MissingName));
    }
}

#[test]
fn email_is_checked_before_name() {
    let fields = WaitlistFields::new("", "not-an-email", UserType::Individual);
    assert_eq!(fields.validate(), Err(ValidationError::InvalidEmail));
}

#[test]
fn validation_is_repeatable() {
    let fields = WaitlistFields::new("Ada", "ada@example", UserType::Individual);
    assert_eq!(fields.validate(), fields.validate());
}

#[test]
fn default_fields_are_empty_individual() {
    let fields = WaitlistFields::default();
    assert_eq!(fields.name, "");
    assert_eq!(fields.email, "");
    assert_eq!(fields.user_type, UserType::Individual);
}

#[test]
fn user_type_parses_case_insensitively() {
    assert_eq!("business".parse::<UserType>(), Ok(UserType::Business));
    assert_eq!(" Individual ".parse::<UserType>(), Ok(UserType::Individual));
    assert!("enterprise".parse::<UserType>().is_err());
}

#[test]
fn entry_serializes_with_wire_field_names() {
    let entry = WaitlistFields::new("Ada", "ada@example.com", UserType::Business)
        .validate()
        .expect("valid");
    let json = serde_json::to_value(&entry).expect("json");

    assert_eq!(
        json,
        serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "userType": "business",
        })
    );
}
