//! End-to-end validation through `#[derive(Inspect)]`.

use proptest::prelude::*;
use ruleguard::prelude::*;
use ruleguard::{
    AccessError, CachingResolver, Member, Operation, Parameter, RegistryResolver, RuleResolver,
    TypeMetadata,
};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Inspect)]
struct Contact {
    #[rule(not_null)]
    email: Option<String>,
}

#[derive(Debug, Inspect)]
struct Unruled {
    nickname: Option<String>,
}

#[derive(Debug, Inspect)]
struct ExemptNickname {
    #[rule(exempt)]
    nickname: Option<String>,
}

#[derive(Debug, Inspect)]
#[meta(audited)]
struct Registration {
    #[rule(not_null, email)]
    email: Option<String>,

    #[rule(length(min = 3, max = 12, message_key = "registration.username"))]
    username: String,

    #[rule(allow_only(value = ["basic", "pro"], ignore_case = true))]
    plan: String,

    #[rule(greater_than(value = 17, required = true))]
    age: Option<u32>,

    #[meta(internal)]
    notes: String,

    #[inspect(synthetic)]
    parent: Option<String>,

    #[inspect(skip)]
    #[allow(dead_code)]
    cache: Vec<u8>,
}

#[derive(Debug, Inspect)]
struct Flags {
    #[rule(flag(validator = "is_true"))]
    enabled: bool,

    #[rule(flag(validator = "is_false"))]
    archived: bool,

    #[meta(flag)]
    #[rule(exempt)]
    note: Option<String>,
}

fn registration() -> Registration {
    Registration {
        email: Some("ada@example.com".into()),
        username: "ada".into(),
        plan: "PRO".into(),
        age: Some(36),
        notes: String::new(),
        parent: None,
        cache: Vec::new(),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn not_null_field_end_to_end() {
    init_tracing();
    let engine = ValidationEngine::standard();

    let mut contact = Contact { email: None };
    let results = engine.validate_fields(&contact).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.is_validated());
    assert_eq!(results.violations()[0].target(), &Target::field("email"));
    assert_eq!(results.violations()[0].code(), "not_null");

    contact.email = Some("ada@example.com".into());
    let results = engine.validate_fields(&contact).unwrap();
    assert!(results.is_empty());
    assert!(results.is_validated());
}

#[test]
fn strict_mode_needs_a_rule_or_exempt_marker() {
    let engine = ValidationEngine::standard();

    let err = engine
        .validate_fields_strict(&Unruled { nickname: None })
        .unwrap_err();
    match err {
        Error::StrictMode(violation) => assert_eq!(violation.target, Target::field("nickname")),
        other => panic!("unexpected error: {other}"),
    }

    let results = engine
        .validate_fields_strict(&ExemptNickname { nickname: None })
        .unwrap();
    assert!(results.is_empty());
    assert!(!results.is_validated());

    // Non-strict never fails on unruled members.
    assert!(engine
        .validate_fields(&Unruled { nickname: None })
        .unwrap()
        .is_empty());
}

#[test]
fn derived_metadata() {
    let subject = registration();
    let meta = subject.metadata();
    assert_eq!(meta.type_name(), "Registration");
    assert_eq!(meta.rules().len(), 1);
    assert!(!meta.rules()[0].is_rule());

    let names: Vec<_> = meta.fields().iter().map(Member::name).collect();
    assert_eq!(names, vec!["email", "username", "plan", "age", "notes", "parent"]);
    assert!(meta.find_field("parent").unwrap().is_synthetic());

    let length = &meta.find_field("username").unwrap().rules()[0];
    assert_eq!(length.kind, "length");
    assert_eq!(length.message_key.as_deref(), Some("registration.username"));
    assert_eq!(length.parameter("min"), Some(&json!(3)));

    let age = &meta.find_field("age").unwrap().rules()[0];
    assert!(age.required);

    assert_eq!(subject.read_field("age").unwrap(), json!(36));
    assert!(matches!(
        subject.read_field("parent"),
        Err(AccessError::NoSuchMember { .. })
    ));
    assert!(subject.read_field("cache").is_err());
}

#[test]
fn valid_registration_passes() {
    let engine = ValidationEngine::standard();
    let subject = registration();
    let results = engine.validate_fields(&subject).unwrap();
    assert!(results.is_empty(), "{:?}", results.report());
    assert!(results.is_validated());
}

#[test]
fn violations_follow_declaration_order() {
    let engine = ValidationEngine::standard();
    let subject = Registration {
        email: Some("nope".into()),
        username: "a-very-long-username".into(),
        plan: "enterprise".into(),
        age: None,
        ..registration()
    };

    let results = engine.validate_fields(&subject).unwrap();
    let codes: Vec<_> = results.iter().map(|v| v.code().to_string()).collect();
    assert_eq!(codes, vec!["email", "length", "allow_only", "greater_than"]);

    let report = serde_json::to_value(results.report()).unwrap();
    assert_eq!(report[0]["target"], json!({"kind": "field", "name": "email"}));
    assert_eq!(report[3]["value"], Value::Null);
}

#[test]
fn strict_mode_flags_marker_only_field() {
    let engine = ValidationEngine::standard();
    let err = engine.validate_fields_strict(&registration()).unwrap_err();
    match err {
        Error::StrictMode(violation) => assert_eq!(violation.target, Target::field("notes")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rendered_messages() {
    let engine = ValidationEngine::standard();
    let subject = Registration {
        username: "ab".into(),
        ..registration()
    };
    let results = engine.validate_fields(&subject).unwrap();
    let violation = &results.violations()[0];

    let mut messages = ruleguard::rules::default_messages();
    messages.insert(
        "en",
        "registration.username",
        "${problem.value} needs ${problem.rule.min} to ${problem.rule.max} characters",
    );
    assert_eq!(
        violation.localized_message(&messages, "en").unwrap(),
        "ab needs 3 to 12 characters"
    );

    let missing = violation.localized_message(&messages, "fr").unwrap_err();
    assert!(matches!(missing, ruleguard::MessageError::Missing(_)));

    let templated = violation
        .localized_message_with(
            &MessageBundle::new().with("en", "registration.username", "${problem.value | upper}"),
            "en",
            &Interpolator::templated(),
        )
        .unwrap();
    assert_eq!(templated, "AB");
}

/// Hand-written subject with accessors, operations and a type rule.
struct Transfer {
    amount: i64,
    currency: String,
}

impl Inspect for Transfer {
    fn metadata(&self) -> &TypeMetadata {
        static META: OnceLock<TypeMetadata> = OnceLock::new();
        META.get_or_init(|| {
            TypeMetadata::new("Transfer")
                .rule(RuleDescriptor::rule("balanced"))
                .field(Member::field("amount").rule(RuleDescriptor::rule("id")))
                .field(Member::field("currency").rule(RuleDescriptor::rule("upper_case")))
                .method(
                    Member::method("get_amount")
                        .rule(RuleDescriptor::rule("greater_than").param("value", 0)),
                )
                .method(Member::method("get_currency").rule(RuleDescriptor::exempt()))
                .method(Member::method("describe").rule(RuleDescriptor::rule("not_null")))
                .operation(
                    Operation::new("submit")
                        .param(Parameter::new("memo").rule(RuleDescriptor::exempt()))
                        .param(
                            Parameter::new("reference")
                                .rule(RuleDescriptor::rule("regex").param("value", "[A-Z]{3}-[0-9]+")),
                        ),
                )
        })
    }

    fn read_field(&self, name: &str) -> Result<Value, AccessError> {
        match name {
            "amount" => Ok(json!(self.amount)),
            "currency" => Ok(json!(self.currency)),
            _ => Err(AccessError::no_such_member("Transfer", name)),
        }
    }

    fn call_accessor(&self, name: &str) -> Result<Value, AccessError> {
        match name {
            "get_amount" => Ok(json!(self.amount)),
            "get_currency" => Ok(json!(self.currency)),
            "describe" => Ok(json!(format!("{} {}", self.amount, self.currency))),
            _ => Err(AccessError::no_such_member("Transfer", name)),
        }
    }
}

#[derive(Debug)]
struct Balanced;

impl Validator for Balanced {
    fn validate<'s>(
        &self,
        subject: &'s dyn Inspect,
        rule: &Arc<RuleDescriptor>,
        target: &Target,
        value: &Value,
    ) -> ruleguard::Outcome<'s> {
        if value["amount"].as_i64() == Some(0) {
            Ok(Some(
                Violation::new(subject, rule.clone(), target.clone(), value.clone())
                    .with_code("unbalanced"),
            ))
        } else {
            Ok(None)
        }
    }
}

fn transfer_engine() -> ValidationEngine {
    ValidationEngine::builder()
        .standard_rules()
        .register_instance("balanced", Balanced)
        .build()
}

#[test]
fn methods_parameters_and_type() {
    let engine = transfer_engine();
    let transfer = Transfer {
        amount: 0,
        currency: "eur".into(),
    };

    let fields = engine.validate_fields(&transfer).unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields.violations()[0].code(), "upper_case");

    // `describe` is not accessor-shaped, so strict mode never sees it.
    let methods = engine.validate_methods_strict(&transfer).unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods.violations()[0].target(), &Target::method("get_amount"));

    let params = engine
        .validate_parameters_strict(&transfer, "submit", &[Value::Null, json!("EUR-12")])
        .unwrap();
    assert!(params.is_empty());
    assert!(params.is_validated());

    let params = engine
        .validate_parameters(&transfer, "submit", &[Value::Null, json!("eur12")])
        .unwrap();
    assert_eq!(
        params.violations()[0].target(),
        &Target::parameter("submit", 1, "reference")
    );

    let type_results = engine.validate_type(&transfer).unwrap();
    assert_eq!(type_results.len(), 1);
    assert_eq!(type_results.violations()[0].code(), "unbalanced");
    assert_eq!(type_results.violations()[0].value()["currency"], "eur");
}

#[test]
fn any_method_filter_reaches_every_method() {
    let engine = transfer_engine();
    let transfer = Transfer {
        amount: 5,
        currency: "EUR".into(),
    };
    let results = engine
        .validate_methods_with(&transfer, &ruleguard::AnyMethod, true)
        .unwrap();
    assert!(results.is_empty());
    assert!(results.is_validated());
}

#[test]
fn merged_results_across_paths() {
    let engine = transfer_engine();
    let transfer = Transfer {
        amount: -3,
        currency: "eur".into(),
    };

    let mut all = engine.validate_fields(&transfer).unwrap();
    all.merge(engine.validate_methods(&transfer).unwrap());
    all.merge(engine.validate_type(&transfer).unwrap());

    let codes: Vec<_> = all.iter().map(|v| v.code().to_string()).collect();
    assert_eq!(codes, vec!["id", "upper_case", "greater_than"]);
    assert!(all.is_validated());
    assert!(all.into_result().is_err());
}

#[test]
fn caching_resolver_is_transparent() {
    let cached = CachingResolver::new(ruleguard::rules::standard_registry());
    let plain = ruleguard::rules::standard_registry();

    let first = cached
        .resolve(&RuleDescriptor::rule("min_length").param("value", 1))
        .unwrap()
        .unwrap();
    let second = cached
        .resolve(&RuleDescriptor::rule("min_length").param("value", 9))
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let with_cache = ValidationEngine::new(cached);
    let without_cache = ValidationEngine::new(plain);
    let subject = Registration {
        email: None,
        username: "x".into(),
        ..registration()
    };
    assert_eq!(
        with_cache.validate_fields(&subject).unwrap().report(),
        without_cache.validate_fields(&subject).unwrap().report()
    );
}

#[test]
fn overridden_references_stay_distinct_under_caching() {
    let subject = Flags {
        enabled: true,
        archived: false,
        note: None,
    };

    for cache in [true, false] {
        let engine = ValidationEngine::builder()
            .standard_rules()
            .cache_validators(cache)
            .build();
        let results = engine.validate_fields_strict(&subject).unwrap();
        assert!(results.is_empty(), "cache={cache}: {:?}", results.report());
        assert!(results.is_validated());

        let flipped = Flags {
            enabled: false,
            archived: true,
            note: None,
        };
        let targets: Vec<_> = engine
            .validate_fields(&flipped)
            .unwrap()
            .iter()
            .map(|v| v.target().name().to_string())
            .collect();
        assert_eq!(targets, vec!["enabled", "archived"]);
    }
}

#[test]
fn meta_attribute_attaches_non_rule_descriptors() {
    let subject = Flags {
        enabled: true,
        archived: false,
        note: Some("x".into()),
    };
    let note = subject.metadata().find_field("note").unwrap();
    assert_eq!(note.rules().len(), 2);
    assert_eq!(note.rules()[0].kind, "flag");
    assert!(note.rules()[0].validator.is_none());
    assert!(note.rules()[1].is_exempt());

    // A cached `flag` rule must not leak into the plain `flag` descriptor.
    let engine = ValidationEngine::standard();
    let results = engine.validate_fields_strict(&subject).unwrap();
    assert!(results.is_empty());
}

#[test]
fn non_rule_descriptors_never_resolve() {
    let registry = RegistryResolver::new();
    for strict in [false, true] {
        let engine = ValidationEngine::builder().strict(strict).build();
        let subject = registration();
        let result = engine.validate_type(&subject);
        if strict {
            assert!(result.unwrap_err().is_strict_mode());
        } else {
            assert!(result.unwrap().is_empty());
        }
    }
    assert!(registry
        .resolve(&RuleDescriptor::marker("audited"))
        .unwrap()
        .is_none());
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = Arc::new(ValidationEngine::standard());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let contact = Contact {
                    email: (i % 2 == 0).then(|| "a@b.co".to_string()),
                };
                engine.validate_fields(&contact).unwrap().len()
            })
        })
        .collect();

    let counts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![0, 1, 0, 1]);
}

fn arb_registration() -> impl Strategy<Value = Registration> {
    (
        proptest::option::of("[a-z@.]{0,16}"),
        "[a-z]{0,16}",
        prop_oneof![Just("basic"), Just("pro"), Just("PRO"), Just("gold")],
        proptest::option::of(0u32..100),
    )
        .prop_map(|(email, username, plan, age)| Registration {
            email,
            username,
            plan: plan.to_string(),
            age,
            ..registration()
        })
}

proptest! {
    #[test]
    fn validation_is_deterministic(subject in arb_registration()) {
        let engine = ValidationEngine::standard();
        let first = engine.validate_fields(&subject).unwrap().report();
        let second = engine.validate_fields(&subject).unwrap().report();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validated_calls_never_fail_strict_on_ruled_members(email in proptest::option::of("[a-z@.]{0,12}")) {
        let engine = ValidationEngine::standard();
        let contact = Contact { email };
        let relaxed = engine.validate_fields(&contact).unwrap();
        prop_assert!(relaxed.is_validated());
        let strict = engine.validate_fields_strict(&contact).unwrap();
        prop_assert_eq!(relaxed.report(), strict.report());
    }

    #[test]
    fn exempt_members_never_fail_strict(nickname in proptest::option::of(".{0,8}")) {
        let engine = ValidationEngine::standard();
        let subject = ExemptNickname { nickname };
        prop_assert!(engine.validate_fields_strict(&subject).is_ok());
    }
}
