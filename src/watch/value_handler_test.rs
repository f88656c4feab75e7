use std::sync::Arc;

use parking_lot::RwLock;

use super::value_handler::ValueHandler;
use crate::BindError;
use crate::DeletePolicy;
use crate::StringCodec;
use crate::ValueListener;

struct NullListener;

impl ValueListener<String> for NullListener {
    fn update(
        &self,
        _path: &str,
        _value: &String,
    ) {
    }
}

#[test]
fn rejects_empty_path() {
    let slot = Arc::new(RwLock::new(String::new()));
    let result = ValueHandler::new(
        String::new(),
        StringCodec,
        Some(slot),
        None,
        DeletePolicy::default(),
        false,
    );
    assert!(matches!(result, Err(BindError::EmptyPath)));
}

#[test]
fn rejects_binding_without_slot_or_listener() {
    let result = ValueHandler::<StringCodec>::new(
        "/cfg".to_string(),
        StringCodec,
        None,
        None,
        DeletePolicy::default(),
        false,
    );
    assert!(matches!(result, Err(BindError::ListenerRequired)));
}

#[test]
fn encodes_current_slot_value_as_seed() {
    let slot = Arc::new(RwLock::new("fallback".to_string()));
    let handler = ValueHandler::new(
        "/cfg".to_string(),
        StringCodec,
        Some(slot),
        None,
        DeletePolicy::default(),
        false,
    )
    .unwrap();
    assert_eq!(handler.encode_current().unwrap(), b"fallback");
}

#[test]
fn watch_only_binding_seeds_empty_payload() {
    let handler = ValueHandler::new(
        "/cfg".to_string(),
        StringCodec,
        None,
        Some(Arc::new(NullListener)),
        DeletePolicy::default(),
        false,
    )
    .unwrap();
    assert!(handler.encode_current().unwrap().is_empty());
}
