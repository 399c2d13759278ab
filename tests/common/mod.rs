//! Shared test helpers and utilities.
//!
//! Token fixtures for the chains under test and a recording test double for
//! the RPC collaborator.

#![allow(dead_code)]

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{address, Address, I256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use v3pool_core::{ContractCaller, PoolLocator};
use v3pool_data::{Chain, ChainRegistry, EmbeddedDescriptors, Token};

/// First token of the reference CREATE2 vector.
pub const TOKEN_A: Address = address!("9d34f1d15c22e4c0924804e2a38cbe93dfb84bc2");
/// Second token of the reference CREATE2 vector.
pub const TOKEN_B: Address = address!("c84da6c8ec7a57cd10b939e79eaf9d2d17834e04");
/// Pool of `TOKEN_A`/`TOKEN_B` at the 0.30% tier on every CREATE2 chain.
pub const TOKEN_AB_POOL_3000: Address = address!("05b552c0a787c228624b389d51eb4277e1f0f348");

pub const OP_WETH: Address = address!("4200000000000000000000000000000000000006");
pub const OP_USDC: Address = address!("7F5c764cBc14f9669B88837ca1490cCa17c31607");
/// Optimism WETH/USDC 0.05% pool.
pub const OP_WETH_USDC_500: Address = address!("85149247691df622eaf1a8bd0cafd40bc45154a9");

pub const BSC_WBNB: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");
pub const BSC_USDT: Address = address!("55d398326f99059fF775485246999027B3197955");

/// WETH on Optimism with 18 decimals.
pub fn op_weth() -> Token {
    Token::new(OP_WETH).with_symbol("WETH")
}

/// USDC on Optimism with 6 decimals.
pub fn op_usdc() -> Token {
    Token::new(OP_USDC).with_decimals(6).with_symbol("USDC")
}

/// Decoded `slot0()` outputs with the given price and tick.
pub fn slot0_outputs(sqrt_price_x96: U256, tick: i32) -> Vec<DynSolValue> {
    vec![
        DynSolValue::Uint(sqrt_price_x96, 160),
        DynSolValue::Int(I256::try_from(tick).expect("tick fits"), 24),
        DynSolValue::Uint(U256::from(7u64), 16),
        DynSolValue::Uint(U256::from(500u64), 16),
        DynSolValue::Uint(U256::from(500u64), 16),
        DynSolValue::Uint(U256::ZERO, 8),
        DynSolValue::Bool(true),
    ]
}

/// One call observed by [`MockCaller`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub contract: Address,
    pub method: String,
    pub args: Vec<DynSolValue>,
    /// Output types the descriptor declares for `method`, empty if absent.
    pub output_types: Vec<String>,
}

/// Test double for the RPC collaborator.
///
/// Returns a canned response per method name and records every call.
/// Methods without a canned response fail like a reverted call.
#[derive(Debug, Default)]
pub struct MockCaller {
    responses: HashMap<String, Result<Vec<DynSolValue>, String>>,
    calls: Mutex<Vec<RecordedCall>>,
    count: AtomicUsize,
}

impl MockCaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(mut self, method: &str, outputs: Vec<DynSolValue>) -> Self {
        self.responses.insert(method.to_string(), Ok(outputs));
        self
    }

    pub fn failing(mut self, method: &str, message: &str) -> Self {
        self.responses
            .insert(method.to_string(), Err(message.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl ContractCaller for MockCaller {
    async fn call(
        &self,
        contract: Address,
        descriptor: &JsonAbi,
        method: &str,
        args: &[DynSolValue],
    ) -> eyre::Result<Vec<DynSolValue>> {
        self.count.fetch_add(1, Ordering::SeqCst);

        let output_types = descriptor
            .function(method)
            .and_then(|overloads| overloads.first())
            .map(|f| f.outputs.iter().map(|p| p.ty.clone()).collect())
            .unwrap_or_default();

        self.calls.lock().expect("mock lock").push(RecordedCall {
            contract,
            method: method.to_string(),
            args: args.to_vec(),
            output_types,
        });

        match self.responses.get(method) {
            Some(Ok(outputs)) => Ok(outputs.clone()),
            Some(Err(message)) => Err(eyre::eyre!("{message}")),
            None => Err(eyre::eyre!("execution reverted: {method}")),
        }
    }
}

/// Locator over the default registry with `caller` installed on every chain.
pub fn locator_with(caller: Arc<MockCaller>) -> PoolLocator {
    Chain::ALL.into_iter().fold(
        PoolLocator::offline(
            Arc::new(ChainRegistry::uniswap_v3()),
            Arc::new(EmbeddedDescriptors),
        ),
        |locator, chain| locator.with_caller(chain, caller.clone()),
    )
}
