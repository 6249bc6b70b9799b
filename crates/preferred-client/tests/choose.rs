//! Integration tests for choose-URL construction.

use chrono::{DateTime, TimeZone, Utc};
use preferred_canonical::{verify, Canonicalizer, ProtocolVariant, Scope, Signature};
use preferred_client::{ChooseClient, ChooseError, ChooseParams, ClientConfig, ErrorKind};
use regex::Regex;
use std::collections::HashMap;
use url::Url;

const IDENTITY: &str = "testing-identity";
const SECRET: &str = "secret123";

fn client() -> ChooseClient {
    ChooseClient::new(ClientConfig::new(IDENTITY, SECRET))
}

fn frozen() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn jacket_params() -> ChooseParams {
    ChooseParams::new(["red", "green", "blue"], "testing")
        .choices_prefix("https://example.com/jacket-")
        .choices_suffix(".jpg")
        .ttl(600)
}

fn query(url: &Url) -> HashMap<String, Vec<String>> {
    let mut pairs: HashMap<String, Vec<String>> = HashMap::new();
    for (k, v) in url.query_pairs() {
        pairs.entry(k.into_owned()).or_default().push(v.into_owned());
    }
    pairs
}

fn single(url: &Url, key: &str) -> Option<String> {
    query(url).get(key).and_then(|v| v.first().cloned())
}

#[test]
fn jacket_example_produces_signed_url() {
    let url = client().create_choose_url(&jacket_params()).unwrap();

    let prefix = Regex::new(r"^https://api\.preferred-pictures\.com/choose\?").unwrap();
    assert!(prefix.is_match(url.as_str()));
    assert!(url.as_str().contains("ttl=600"));
    assert!(url.as_str().contains("tournament=testing"));

    let signature = single(&url, "signature").unwrap();
    assert!(Regex::new(r"^[0-9a-f]{64}$").unwrap().is_match(&signature));
}

#[test]
fn required_keys_are_always_present() {
    let url = client()
        .create_choose_url(&ChooseParams::new(["a"], "t"))
        .unwrap();
    let pairs = query(&url);
    for key in ["uid", "identity", "signature", "expiration", "tournament"] {
        assert!(pairs.contains_key(key), "missing {key}");
    }
    assert_eq!(single(&url, "identity").as_deref(), Some(IDENTITY));
}

#[test]
fn golden_url_with_frozen_clock() {
    let params = jacket_params().uid("fixed-uid");
    let url = client().create_choose_url_at(&params, frozen()).unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.preferred-pictures.com/choose?\
         choices_prefix=https%3A%2F%2Fexample.com%2Fjacket-\
         &choices_suffix=.jpg\
         &choices%5B%5D=red&choices%5B%5D=green&choices%5B%5D=blue\
         &expiration=1700003600&tournament=testing&ttl=600&uid=fixed-uid\
         &identity=testing-identity\
         &signature=0378c524a0725abf2d248de1722afb925d40638bf479fc254c337c3cc65deb37"
    );
}

#[test]
fn choices_travel_as_repeated_array_keys() {
    let url = client().create_choose_url(&jacket_params()).unwrap();
    assert_eq!(
        query(&url).get("choices[]").cloned().unwrap(),
        vec!["red", "green", "blue"]
    );
}

#[test]
fn identical_inputs_sign_identically() {
    let params = jacket_params().uid("same");
    let a = client().sign_choose(&params, frozen()).unwrap();
    let b = client().sign_choose(&params, frozen()).unwrap();
    assert_eq!(a.signature, b.signature);
    assert_eq!(a.url, b.url);
}

#[test]
fn any_signed_field_changes_full_signature() {
    let base = jacket_params().uid("same");
    let reference = client().sign_choose(&base, frozen()).unwrap().signature;

    let variations = [
        base.clone().uid("other"),
        base.clone().ttl(601),
        base.clone().json(true),
        base.clone().go(true),
        base.clone().choices_prefix("https://example.com/coat-"),
        base.clone().choices_suffix(".png"),
        base.clone().destinations(["https://shop/red"]),
        base.clone().destinations_prefix("https://shop/"),
        base.clone().destinations_suffix("?ref=pp"),
        ChooseParams {
            choices: vec!["red".into(), "blue".into(), "green".into()],
            ..base.clone()
        },
        ChooseParams {
            tournament: "other".into(),
            ..base.clone()
        },
    ];
    for params in variations {
        let signature = client().sign_choose(&params, frozen()).unwrap().signature;
        assert_ne!(signature, reference, "{params:?}");
    }

    let later = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
    assert_ne!(
        client().sign_choose(&base, later).unwrap().signature,
        reference
    );
}

#[test]
fn limited_signature_ignores_uid_expiration_and_flags() {
    let base = jacket_params().uid("one").limited_signature(true);
    let reference = client().sign_choose(&base, frozen()).unwrap();
    assert_eq!(
        single(&reference.url, "limited_signature").as_deref(),
        Some("true")
    );

    let later = Utc.timestamp_opt(1_700_009_999, 500).unwrap();
    let unsigned_variations = [
        base.clone().uid("two"),
        base.clone().json(true),
        base.clone().go(true),
        base.clone().expiration_ttl(7200),
    ];
    for params in unsigned_variations {
        let signed = client().sign_choose(&params, later).unwrap();
        assert_eq!(signed.signature, reference.signature, "{params:?}");
    }

    let signed_variations = [
        base.clone().ttl(300),
        base.clone().choices_prefix("https://example.com/coat-"),
        base.clone().choices_suffix(".png"),
        ChooseParams {
            choices: vec!["red".into(), "green".into()],
            ..base.clone()
        },
        ChooseParams {
            tournament: "other".into(),
            ..base.clone()
        },
    ];
    for params in signed_variations {
        let signed = client().sign_choose(&params, frozen()).unwrap();
        assert_ne!(signed.signature, reference.signature, "{params:?}");
    }
}

#[test]
fn limited_fields_still_travel_in_url() {
    let params = jacket_params().uid("one").json(true).limited_signature(true);
    let url = client().create_choose_url_at(&params, frozen()).unwrap();
    assert_eq!(single(&url, "uid").as_deref(), Some("one"));
    assert_eq!(single(&url, "json").as_deref(), Some("true"));
    assert_eq!(single(&url, "expiration").as_deref(), Some("1700003600"));
}

#[test]
fn exactly_max_choices_succeeds_and_one_more_fails() {
    let config = ClientConfig::new(IDENTITY, SECRET);
    let max = config.max_choices();
    let client = ChooseClient::new(config);

    let at_max: Vec<String> = (0..max).map(|i| format!("c{i}")).collect();
    assert!(client
        .create_choose_url(&ChooseParams::new(at_max, "t"))
        .is_ok());

    let over: Vec<String> = (0..=max).map(|i| format!("c{i}")).collect();
    let err = client
        .create_choose_url(&ChooseParams::new(over, "t"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, ChooseError::TooManyChoices { count: 36, max: 35 }));
    assert!(err.to_string().contains("35"));
}

#[test]
fn configured_max_choices_is_enforced() {
    let client = ChooseClient::new(
        ClientConfig::new(IDENTITY, SECRET)
            .with_max_choices(2)
            .unwrap(),
    );
    let err = client
        .create_choose_url(&ChooseParams::new(["a", "b", "c"], "t"))
        .unwrap_err();
    assert!(err.to_string().contains("maximum of 2"));
}

#[test]
fn empty_choices_fail() {
    let err = client()
        .create_choose_url(&ChooseParams::new(Vec::<String>::new(), "t"))
        .unwrap_err();
    assert!(matches!(err, ChooseError::NoChoices));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "no choices supplied");
}

#[test]
fn ttl_bound_by_expiration_horizon() {
    let equal = ChooseParams::new(["a"], "t").ttl(120).expiration_ttl(120);
    assert!(client().create_choose_url(&equal).is_ok());

    let over = ChooseParams::new(["a"], "t").ttl(121).expiration_ttl(120);
    let err = client().create_choose_url(&over).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(
        err,
        ChooseError::TtlExceedsExpiration {
            ttl: 121,
            expiration_ttl: 120
        }
    ));

    let over_default = ChooseParams::new(["a"], "t").ttl(3601);
    assert!(client().create_choose_url(&over_default).is_err());
}

#[test]
fn ttl_check_runs_before_choice_checks() {
    let params = ChooseParams::new(Vec::<String>::new(), "t")
        .ttl(10)
        .expiration_ttl(5);
    assert_eq!(
        client().create_choose_url(&params).unwrap_err().kind(),
        ErrorKind::Configuration
    );
}

#[test]
fn generated_uids_differ() {
    let params = ChooseParams::new(["a"], "t");
    let a = client().sign_choose(&params, frozen()).unwrap();
    let b = client().sign_choose(&params, frozen()).unwrap();
    assert_ne!(a.uid, b.uid);
    assert_ne!(a.signature, b.signature);
    assert_eq!(uuid::Uuid::parse_str(a.uid.as_str()).unwrap().get_version_num(), 4);
}

#[test]
fn omitted_flags_are_absent_from_query() {
    let url = client()
        .create_choose_url(&ChooseParams::new(["a"], "t"))
        .unwrap();
    let pairs = query(&url);
    assert!(!pairs.contains_key("json"));
    assert!(!pairs.contains_key("go"));
    assert!(!pairs.contains_key("ttl"));
    assert!(!pairs.contains_key("limited_signature"));
}

#[test]
fn false_flags_are_absent_from_query() {
    let url = client()
        .create_choose_url(&ChooseParams::new(["a"], "t").json(false).go(false))
        .unwrap();
    assert!(!url.as_str().contains("json="));
    assert!(!url.as_str().contains("go="));
}

#[test]
fn expiration_defaults_to_one_hour_and_rounds_up() {
    let now = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
    let signed = client()
        .sign_choose(&ChooseParams::new(["a"], "t"), now)
        .unwrap();
    assert_eq!(signed.expiration, 1_700_003_601);
    assert_eq!(
        single(&signed.url, "expiration").as_deref(),
        Some("1700003601")
    );
}

#[test]
fn destinations_are_sent_and_signed() {
    let params = ChooseParams::new(["a", "b"], "t")
        .destinations(["https://x/a", "https://x/b"])
        .destinations_prefix("p")
        .destinations_suffix("s")
        .uid("u");
    let (fields, scope) = client().assemble(&params, frozen()).unwrap();
    let canonical = Canonicalizer::new(ProtocolVariant::Current)
        .canonicalize(&fields, scope)
        .unwrap();
    assert_eq!(
        canonical.text,
        "a,b/p/s/https://x/a,https://x/b/1700003600/t/u"
    );

    let signed = client().sign_choose(&params, frozen()).unwrap();
    assert_eq!(
        query(&signed.url).get("destinations[]").cloned().unwrap(),
        vec!["https://x/a", "https://x/b"]
    );
    assert!(verify(SECRET.as_bytes(), &canonical, &signed.signature));
}

#[test]
fn signature_verifies_against_canonical_string() {
    let params = jacket_params().limited_signature(true);
    let signed = client().sign_choose(&params, frozen()).unwrap();
    let (fields, scope) = client().assemble(&params.uid(signed.uid.clone()), frozen()).unwrap();
    assert_eq!(scope, Scope::Limited);
    let canonical = Canonicalizer::default().canonicalize(&fields, scope).unwrap();
    let claimed = Signature::parse(single(&signed.url, "signature").unwrap()).unwrap();
    assert!(verify(SECRET.as_bytes(), &canonical, &claimed));
}

#[test]
fn legacy_variant_joins_choices_and_uses_short_prefix_names() {
    let client = ChooseClient::new(
        ClientConfig::new(IDENTITY, SECRET).with_variant(ProtocolVariant::Legacy),
    );
    let params = jacket_params().uid("fixed-uid").json(true);
    let signed = client.sign_choose(&params, frozen()).unwrap();

    let pairs = query(&signed.url);
    assert_eq!(pairs.get("choices").cloned().unwrap(), vec!["red,green,blue"]);
    assert_eq!(
        pairs.get("prefix").cloned().unwrap(),
        vec!["https://example.com/jacket-"]
    );
    assert_eq!(pairs.get("suffix").cloned().unwrap(), vec![".jpg"]);
    assert!(!pairs.contains_key("choices[]"));
    assert_eq!(
        signed.signature.as_str(),
        "8db4eb02f4c430ce2ee7f25cc0ca3f9e03769b26491252053cc2d5774a3560f6"
    );
}

#[test]
fn legacy_variant_sends_flags_and_destinations_unsigned() {
    let client = ChooseClient::new(
        ClientConfig::new(IDENTITY, SECRET).with_variant(ProtocolVariant::Legacy),
    );
    let plain = jacket_params().uid("fixed-uid");
    let extended = plain
        .clone()
        .json(true)
        .go(true)
        .destinations(["https://shop/r", "https://shop/g", "https://shop/b"])
        .destinations_prefix("p");

    let signed = client.sign_choose(&extended, frozen()).unwrap();
    let pairs = query(&signed.url);
    assert_eq!(pairs.get("json").cloned().unwrap(), vec!["true"]);
    assert_eq!(pairs.get("go").cloned().unwrap(), vec!["true"]);
    assert_eq!(pairs.get("destinations[]").map(Vec::len), Some(3));
    assert_eq!(pairs.get("destinations_prefix").cloned().unwrap(), vec!["p"]);

    let reference = client.sign_choose(&plain, frozen()).unwrap();
    assert_eq!(signed.signature, reference.signature);

    let keys: Vec<String> = signed.url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    assert_eq!(keys.last().map(String::as_str), Some("signature"));
    assert_eq!(keys[keys.len() - 2], "identity");
}

#[test]
fn empty_destinations_sign_like_no_destinations() {
    let params = ChooseParams::new(["a", "b"], "t").uid("u");
    let with_empty = params.clone().destinations(Vec::<String>::new());

    let (fields, scope) = client().assemble(&with_empty, frozen()).unwrap();
    let canonical = Canonicalizer::default().canonicalize(&fields, scope).unwrap();
    assert_eq!(canonical.text, "a,b/1700003600/t/u");

    let plain = client().sign_choose(&params, frozen()).unwrap();
    let empty = client().sign_choose(&with_empty, frozen()).unwrap();
    assert_eq!(empty.signature, plain.signature);
    assert_eq!(empty.url, plain.url);
    assert!(!query(&empty.url).contains_key("destinations[]"));
}

#[test]
fn custom_endpoint_is_used() {
    let client = ChooseClient::new(
        ClientConfig::new(IDENTITY, SECRET)
            .with_endpoint("http://localhost:9000")
            .unwrap(),
    );
    let url = client
        .create_choose_url(&ChooseParams::new(["a"], "t"))
        .unwrap();
    assert!(url.as_str().starts_with("http://localhost:9000/choose?"));
}

#[test]
fn secret_never_appears_in_url() {
    let url = client().create_choose_url(&jacket_params()).unwrap();
    assert!(!url.as_str().contains(SECRET));
}

#[test]
fn shared_client_signs_concurrently() {
    let client = std::sync::Arc::new(client());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            std::thread::spawn(move || {
                let params = jacket_params().uid(format!("thread-{i}"));
                client.sign_choose(&params, frozen()).unwrap().uid
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap().as_str(), format!("thread-{i}"));
    }
}
