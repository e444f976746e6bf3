//! End-to-end tests for the redaction pipeline
//!
//! Most tests drive the engine with a scripted model so expectations do not
//! depend on the built-in heuristics.

use piitag::redaction::detector::{ModelAdapter, ModelAnalysis, ModelEntity, ModelLabel};
use piitag::redaction::{EntityKind, RedactionConfig, RedactionEngine, Restorer};
use std::sync::Arc;

/// Model that labels the given substrings of whatever text it sees
struct ScriptedModel {
    entities: Vec<(&'static str, ModelLabel)>,
}

impl ScriptedModel {
    fn persons(names: &[&'static str]) -> Self {
        Self {
            entities: names.iter().map(|n| (*n, ModelLabel::Person)).collect(),
        }
    }
}

impl ModelAdapter for ScriptedModel {
    fn analyze(&self, text: &str) -> anyhow::Result<ModelAnalysis> {
        let mut entities = Vec::new();
        for (needle, label) in &self.entities {
            for (start, found) in text.match_indices(needle) {
                entities.push(ModelEntity {
                    start,
                    end: start + found.len(),
                    label: *label,
                });
            }
        }
        entities.sort_by_key(|e| (e.start, e.end));
        Ok(ModelAnalysis {
            tokens: Vec::new(),
            entities,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn engine(model: ScriptedModel) -> RedactionEngine {
    engine_with(RedactionConfig::default(), model)
}

fn engine_with(config: RedactionConfig, model: ScriptedModel) -> RedactionEngine {
    RedactionEngine::with_model(config, Arc::new(model)).unwrap()
}

#[test]
fn test_resume_end_to_end() {
    let text = "Steve Johnson\n\
                steve.johnson@gmail.com | 415-555-0134\n\
                \n\
                Experience\n\
                Worked with Mary Jackson on billing.\n";
    let engine = engine(ScriptedModel::persons(&["Steve Johnson", "Mary Jackson"]));

    let document = engine.process_named("resume.txt", text).unwrap();

    assert_eq!(
        document.redacted_text,
        "<<SJ>>\n<<EMAIL_1>> | <<PHONE_1>>\n\nExperience\nWorked with <<MJ>> on billing.\n"
    );
    assert_eq!(document.mapping.original("<<SJ>>"), Some("Steve Johnson"));
    assert_eq!(document.mapping.original("<<MJ>>"), Some("Mary Jackson"));
    assert_eq!(
        document.mapping.original("<<EMAIL_1>>"),
        Some("steve.johnson@gmail.com")
    );
    assert_eq!(document.mapping.original("<<PHONE_1>>"), Some("415-555-0134"));

    let restored = Restorer::new()
        .restore(&document.redacted_text, &document.mapping)
        .unwrap();
    assert_eq!(restored, text);
}

#[test]
fn test_shared_initials_get_numbered_tags() {
    let text = "Steve Johnson reviewed the plan with Sarah Jones.";
    let engine = engine(ScriptedModel::persons(&["Steve Johnson", "Sarah Jones"]));

    let document = engine.process(text).unwrap();
    assert_eq!(
        document.redacted_text,
        "<<SJ>> reviewed the plan with <<SJ2>>."
    );
    assert_eq!(document.mapping.original("<<SJ2>>"), Some("Sarah Jones"));
}

#[test]
fn test_name_variants_share_a_tag() {
    let text = "Steve Johnson joined in May. Later, Steve presented the roadmap.";
    let engine = engine(ScriptedModel::persons(&["Steve Johnson", "Steve"]));

    let document = engine.process(text).unwrap();
    assert_eq!(
        document.redacted_text,
        "<<SJ>> joined in May. Later, <<SJ>> presented the roadmap."
    );
    assert_eq!(document.mapping.person_tag("Steve"), Some("<<SJ>>"));
    assert_eq!(document.mapping.person_tag("Steve Johnson"), Some("<<SJ>>"));
}

#[test]
fn test_same_value_reuses_typed_tag() {
    let text = "Write to ops@acme.io. Escalations also go to ops@acme.io or help@acme.io.";
    let engine = engine(ScriptedModel::persons(&[]));

    let document = engine.process(text).unwrap();
    assert_eq!(
        document.redacted_text,
        "Write to <<EMAIL_1>>. Escalations also go to <<EMAIL_1>> or <<EMAIL_2>>."
    );
    assert_eq!(document.counts_by_kind().get(&EntityKind::Email), Some(&3));
}

#[test]
fn test_patterns_win_over_model_spans() {
    let text = "Mail ann.lee@acme.io before noon.";
    // The model mistakes the mailbox name for a person
    let engine = engine(ScriptedModel::persons(&["ann.lee"]));

    let document = engine.process(text).unwrap();
    assert_eq!(document.redacted_text, "Mail <<EMAIL_1>> before noon.");
    assert!(document.mapping.persons.is_empty());
}

#[test]
fn test_replacement_spans_are_disjoint_and_ordered() {
    let text = "Steve Johnson (steve@acme.io, 415-555-0134) met Mary Jackson at https://acme.io/team.";
    let engine = engine(ScriptedModel::persons(&["Steve Johnson", "Mary Jackson"]));

    let document = engine.process(text).unwrap();
    assert!(document.spans.len() >= 5);
    for pair in document.spans.windows(2) {
        assert!(
            pair[0].span.end <= pair[1].span.start,
            "{:?} overlaps {:?}",
            pair[0].span,
            pair[1].span
        );
    }
}

#[test]
fn test_blocklisted_terms_are_kept() {
    let text = "Falcon Ridge shipped on time thanks to Mary Jackson.";
    let mut config = RedactionConfig::default();
    config.blocklist.terms = vec!["Falcon Ridge".to_string()];
    let engine = engine_with(
        config,
        ScriptedModel::persons(&["Falcon Ridge", "Mary Jackson"]),
    );

    let document = engine.process(text).unwrap();
    assert_eq!(
        document.redacted_text,
        "Falcon Ridge shipped on time thanks to <<MJ>>."
    );
    let reasons: Vec<&str> = document
        .rejections
        .iter()
        .map(|r| r.reason.code())
        .collect();
    assert!(reasons.contains(&"blocklisted"));
}

#[test]
fn test_section_headings_and_job_titles_rejected() {
    let text = "Professional Summary\nSenior Software Engineer with ten years of practice.";
    let engine = engine(ScriptedModel::persons(&[
        "Professional Summary",
        "Senior Software Engineer",
    ]));

    let document = engine.process(text).unwrap();
    assert_eq!(document.redacted_text, text);
    let reasons: Vec<&str> = document
        .rejections
        .iter()
        .map(|r| r.reason.code())
        .collect();
    assert!(reasons.contains(&"section_header"));
    assert!(reasons.contains(&"job_title"));
}

#[test]
fn test_confidence_threshold_is_inclusive() {
    // A lone capitalized token without POS tags scores exactly 0.6
    let text = "We owe the fix to Steve today.";

    let at_threshold = engine(ScriptedModel::persons(&["Steve"]));
    let document = at_threshold.process(text).unwrap();
    assert_eq!(document.redacted_text, "We owe the fix to <<S>> today.");

    let mut config = RedactionConfig::default();
    config.validation.confidence_threshold = 0.65;
    let above_threshold = engine_with(config, ScriptedModel::persons(&["Steve"]));
    let document = above_threshold.process(text).unwrap();
    assert_eq!(document.redacted_text, text);
    assert_eq!(document.rejections[0].reason.code(), "low_confidence");
}

#[test]
fn test_places_and_orgs_are_opt_in() {
    let text = "She moved to Denver to join Initech.";
    let model = || ScriptedModel {
        entities: vec![("Denver", ModelLabel::Gpe), ("Initech", ModelLabel::Org)],
    };

    let document = engine(model()).process(text).unwrap();
    assert_eq!(document.redacted_text, text);

    let mut config = RedactionConfig::default();
    config.detection.redact_places_and_orgs = true;
    let document = engine_with(config, model()).process(text).unwrap();
    assert_eq!(document.redacted_text, "She moved to <<GPE_1>> to join <<ORG_1>>.");
}

#[test]
fn test_redaction_is_deterministic() {
    let text = "Steve Johnson and Sarah Jones. Contact steve@acme.io or 415-555-0134.";
    let engine = engine(ScriptedModel::persons(&["Steve Johnson", "Sarah Jones"]));

    let first = engine.process(text).unwrap();
    let second = engine.process(text).unwrap();
    assert_eq!(first.redacted_text, second.redacted_text);
    assert_eq!(first.mapping.tags, second.mapping.tags);
    assert_eq!(first.mapping.persons, second.mapping.persons);
}

#[test]
fn test_multibyte_text_keeps_offsets() {
    let text = "Résumé of Zoë Ångström · reach her at zoe@example.io or on Tuesdays.";
    let engine = engine(ScriptedModel::persons(&["Zoë Ångström"]));

    let document = engine.process(text).unwrap();
    assert_eq!(
        document.redacted_text,
        "Résumé of <<ZÅ>> · reach her at <<EMAIL_1>> or on Tuesdays."
    );
    let restored = Restorer::new()
        .restore(&document.redacted_text, &document.mapping)
        .unwrap();
    assert_eq!(restored, text);
}

#[test]
fn test_heuristic_model_round_trip() {
    let text = "Call 555-123-4567 or write to help@acme.io before Friday.";
    let engine = RedactionEngine::new(RedactionConfig::default()).unwrap();

    let document = engine.process(text).unwrap();
    assert!(!document.redacted_text.contains("555-123-4567"));
    assert!(!document.redacted_text.contains("help@acme.io"));

    let restored = Restorer::new()
        .restore(&document.redacted_text, &document.mapping)
        .unwrap();
    assert_eq!(restored, text);
}

#[test]
fn test_irregular_spacing_in_names_round_trips() {
    let text = "Reported to Mary  Jackson today";
    let engine = RedactionEngine::new(RedactionConfig::default()).unwrap();

    let document = engine.process(text).unwrap();
    assert!(!document.redacted_text.contains("Jackson"));
    let restored = Restorer::new()
        .restore(&document.redacted_text, &document.mapping)
        .unwrap();
    assert_eq!(restored, text);

    let scripted = engine_with(
        RedactionConfig::default(),
        ScriptedModel::persons(&["Mary\tJackson"]),
    );
    let tabbed = "Reported to Mary\tJackson today";
    let document = scripted.process(tabbed).unwrap();
    assert_eq!(document.redacted_text, "Reported to <<MJ>> today");
    assert_eq!(document.mapping.original("<<MJ>>"), Some("Mary\tJackson"));
}

#[test]
fn test_generated_names_round_trip() {
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    let engine = RedactionEngine::new(RedactionConfig::default()).unwrap();
    for _ in 0..20 {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let email: String = SafeEmail().fake();
        let text = format!("Prepared by {first} {last}.\nQuestions go to {email} this week.");

        let document = engine.process(&text).unwrap();
        assert!(!document.redacted_text.contains(&email));
        let restored = Restorer::new()
            .restore(&document.redacted_text, &document.mapping)
            .unwrap();
        assert_eq!(restored, text);
    }
}
