//! Selector and topic helpers

use crate::output::{word_hex, Output};
use crate::CliError;

/// Print the 4-byte selector of a function signature
pub fn selector(signature: &str, json: bool) -> Result<(), CliError> {
    let selector = slotvm_crypto::selector(signature);
    Output::new(json)
        .field("signature", signature)
        .field("selector", &selector.to_string())
        .message(&selector.to_string())
        .print();
    Ok(())
}

/// Print the topic hash of an event signature
pub fn topic(signature: &str, json: bool) -> Result<(), CliError> {
    let topic = slotvm_crypto::event_topic(signature);
    Output::new(json)
        .field("signature", signature)
        .field_word("topic", &topic)
        .message(&word_hex(&topic))
        .print();
    Ok(())
}
