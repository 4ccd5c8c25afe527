//! Built-in demonstration contracts

use bytes::Bytes;
use clap::ValueEnum;
use serde_json::{Map, Value};
use slotvm_crypto::{event_topic, selector};
use slotvm_evm::{
    ContractRegistry, Dispatcher, ExecutionResult, Executor, Message, VmError, VmResult,
};
use slotvm_primitives::{parse_word, to_bytes32, Address, Word};
use slotvm_storage::layout::list_element_location;
use slotvm_storage::{PackedField, WorldState};

use crate::config::Config;
use crate::output::{word_hex, Output};
use crate::CliError;

/// Demo scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoScenario {
    /// Update one field of a slot holding four packed fields
    Packed,
    /// Push four elements onto a list stored at slot 5
    List,
    /// Child call writes then reverts; the caller's writes survive
    NestedRevert,
    /// Recurse into the same contract until a call fails
    Depth,
}

const USER: Address = Address::from_bytes([0xEE; 20]);
const PRIMARY: Address = Address::from_bytes([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10,
]);
const SECONDARY: Address = Address::from_bytes([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x11,
]);

const PACKED_SLOT: &str = "0x0001000800000000000000000000000600000000000000000000000000000004";
const LIST_BASE: u64 = 5;

/// Run `scenario` and print what happened
pub fn run(
    scenario: DemoScenario,
    max_depth: Option<usize>,
    config: &Config,
    json: bool,
) -> Result<(), CliError> {
    let mut vm_config = config.vm.clone();
    if let Some(depth) = max_depth {
        vm_config.max_call_depth = depth;
    }
    let executor = Executor::new(vm_config);

    let (state, result, accounts) = match scenario {
        DemoScenario::Packed => packed(&executor, config.budget)?,
        DemoScenario::List => list(&executor, config.budget)?,
        DemoScenario::NestedRevert => nested_revert(&executor, config.budget)?,
        DemoScenario::Depth => depth(&executor, config.budget)?,
    };
    report(scenario, &state, &result, &accounts, json);
    Ok(())
}

fn word_out(word: Word) -> Bytes {
    Bytes::from(to_bytes32(&word).to_vec())
}

fn word_arg(args: &[u8]) -> VmResult<Word> {
    match args.get(..32) {
        Some(bytes) => Ok(Word::from_big_endian(bytes)),
        None => Err(VmError::revert(Bytes::from_static(b"missing argument"))),
    }
}

fn message(target: Address, input: Vec<u8>, budget: u64) -> Message {
    Message::new(USER, target, input, budget)
}

type Run = (WorldState, ExecutionResult, Vec<Address>);

fn packed(executor: &Executor, budget: u64) -> Result<Run, CliError> {
    let raw = parse_word(PACKED_SLOT).map_err(|e| CliError::InvalidWord(e.to_string()))?;
    let contract = Dispatcher::new().with_handler(selector("bump()"), |ctx, _args| {
        let field = PackedField::new(Word::zero(), 224, 16)?;
        ctx.sstore_packed(&field, Word::from(0x000au64))?;
        Ok(word_out(ctx.sload_packed(&field)?))
    });
    let registry = ContractRegistry::new().with_contract(PRIMARY, contract);
    let mut state =
        WorldState::new().with_account(PRIMARY, [(Word::zero(), raw)].into_iter().collect());

    let input = selector("bump()").with_args(&[]);
    let result = executor.invoke(&mut state, &registry, message(PRIMARY, input, budget));
    Ok((state, result, vec![PRIMARY]))
}

fn list(executor: &Executor, budget: u64) -> Result<Run, CliError> {
    let base = Word::from(LIST_BASE);
    let contract = Dispatcher::new().with_handler(selector("push(uint256)"), move |ctx, args| {
        let length = ctx.sload(&base)?;
        ctx.sstore(list_element_location(base, length), word_arg(args)?)?;
        ctx.sstore(base, length.overflowing_add(Word::one()).0)?;
        ctx.emit(vec![event_topic("Pushed(uint256)")], word_out(length))?;
        Ok(word_out(length))
    });
    let registry = ContractRegistry::new().with_contract(PRIMARY, contract);
    let mut state = WorldState::new();

    let mut last = None;
    for value in [10u64, 20, 30, 40] {
        let input = selector("push(uint256)").with_args(&to_bytes32(&Word::from(value)));
        let result = executor.invoke(&mut state, &registry, message(PRIMARY, input, budget));
        if !result.success {
            return Ok((state, result, vec![PRIMARY]));
        }
        last = Some(result);
    }
    let result = last.ok_or_else(|| CliError::Execution("no push executed".to_string()))?;
    Ok((state, result, vec![PRIMARY]))
}

fn nested_revert(executor: &Executor, budget: u64) -> Result<Run, CliError> {
    let child = Dispatcher::new().with_fallback(|ctx, _input| {
        ctx.sstore(Word::from(7u64), Word::from(99u64))?;
        ctx.emit(vec![event_topic("Written(uint256)")], Bytes::new())?;
        Err(VmError::revert(Bytes::from_static(b"child reverted")))
    });
    let parent = Dispatcher::new().with_fallback(|ctx, _input| {
        ctx.sstore(Word::one(), Word::from(11u64))?;
        ctx.emit(vec![event_topic("Started()")], Bytes::new())?;
        let gas = ctx.gas_remaining();
        let outcome = ctx.call(SECONDARY, vec![0u8; 4], gas)?;
        Ok(word_out(Word::from(u64::from(outcome.success))))
    });
    let registry = ContractRegistry::new()
        .with_contract(PRIMARY, parent)
        .with_contract(SECONDARY, child);
    let mut state = WorldState::new()
        .with_account(SECONDARY, [(Word::from(7u64), Word::from(5u64))].into_iter().collect());

    let result = executor.invoke(&mut state, &registry, message(PRIMARY, vec![0u8; 4], budget));
    Ok((state, result, vec![PRIMARY, SECONDARY]))
}

fn depth(executor: &Executor, budget: u64) -> Result<Run, CliError> {
    // slot 0: deepest frame that saw its nested call fail
    // slot 1: 1 for the depth limit, 2 for anything else
    let contract = Dispatcher::new().with_fallback(|ctx, input| {
        let (target, gas) = (ctx.address(), ctx.gas_remaining());
        let outcome = ctx.call(target, input.to_vec(), gas)?;
        if !outcome.success {
            let cause = match outcome.error {
                Some(VmError::CallDepthExceeded { .. }) => 1u64,
                _ => 2,
            };
            let depth = Word::from(ctx.depth() as u64);
            ctx.sstore(Word::zero(), depth)?;
            ctx.sstore(Word::one(), Word::from(cause))?;
        }
        Ok(Bytes::new())
    });
    let registry = ContractRegistry::new().with_contract(PRIMARY, contract);
    let mut state = WorldState::new();
    let result = executor.invoke(&mut state, &registry, message(PRIMARY, vec![0u8; 4], budget));
    Ok((state, result, vec![PRIMARY]))
}

fn report(
    scenario: DemoScenario,
    state: &WorldState,
    result: &ExecutionResult,
    accounts: &[Address],
    json: bool,
) {
    let mut storage = Map::new();
    let mut lines = Vec::new();
    for address in accounts {
        let mut slots = Map::new();
        if let Some(map) = state.storage(address) {
            for (slot, value) in map.iter() {
                slots.insert(word_hex(slot), Value::String(word_hex(value)));
                lines.push(format!("  {} [{}] = {}", address, word_hex(slot), word_hex(value)));
            }
        }
        storage.insert(address.to_string(), Value::Object(slots));
    }

    let error = result
        .error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_default();
    let output = format!("0x{}", hex::encode(&result.output));

    Output::new(json)
        .field("scenario", &format!("{scenario:?}"))
        .field_bool("success", result.success)
        .field("output", &output)
        .field("error", &error)
        .field_u64("gas_used", result.gas_used)
        .field_u64("logs", result.logs.len() as u64)
        .field_value("storage", Value::Object(storage))
        .message(&format!(
            "Scenario: {scenario:?}\nSuccess: {}\nOutput: {}\nError: {}\nGas used: {}\nLogs: {}\nStorage:\n{}",
            result.success,
            output,
            if error.is_empty() { "-" } else { error.as_str() },
            result.gas_used,
            result.logs.len(),
            lines.join("\n")
        ))
        .print();
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotvm_evm::VmConfig;

    #[test]
    fn test_packed_demo_updates_one_field() {
        let (state, result, _) = packed(&Executor::default(), 1_000_000).unwrap();
        assert!(result.success);
        let read = |offset, width| {
            state.read_packed(&PRIMARY, &PackedField::new(Word::zero(), offset, width).unwrap())
        };
        assert_eq!(read(224, 16), Word::from(0x000au64));
        assert_eq!(read(0, 128), Word::from(4u64));
        assert_eq!(read(128, 96), Word::from(6u64));
        assert_eq!(read(240, 16), Word::one());
    }

    #[test]
    fn test_list_demo() {
        let (state, result, _) = list(&Executor::default(), 1_000_000).unwrap();
        assert!(result.success);
        let base = Word::from(LIST_BASE);
        assert_eq!(state.read(&PRIMARY, &base), Word::from(4u64));
        assert_eq!(
            state.read(&PRIMARY, &list_element_location(base, Word::from(3u64))),
            Word::from(40u64)
        );
    }

    #[test]
    fn test_nested_revert_demo() {
        let (state, result, _) = nested_revert(&Executor::default(), 1_000_000).unwrap();
        assert!(result.success);
        assert_eq!(Word::from_big_endian(&result.output), Word::zero());
        assert_eq!(state.read(&SECONDARY, &Word::from(7u64)), Word::from(5u64));
        assert_eq!(state.read(&PRIMARY, &Word::one()), Word::from(11u64));
        assert_eq!(result.logs.len(), 1);
    }

    #[test]
    fn test_depth_demo_hits_limit() {
        let executor = Executor::new(VmConfig::default().with_max_call_depth(4));
        let (state, result, _) = depth(&executor, 10_000_000).unwrap();
        assert!(result.success);
        assert_eq!(state.read(&PRIMARY, &Word::zero()), Word::from(4u64));
        assert_eq!(state.read(&PRIMARY, &Word::one()), Word::one());
    }
}
