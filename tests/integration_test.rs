//! Integration Tests - Use Cases Against Mocked Node and Wallet
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.
//! The mocked node answers `eth_call` from a table keyed by contract
//! address and function selector.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use mockall::mock;
use mockall::predicate::*;
use tokio::sync::{broadcast, mpsc};

use djed_client::config::{ContractConfig, ScalingConfig};
use djed_client::domain::abi::{IDjed, IDjedCoin, IOracle};
use djed_client::domain::{
    AccountDetails, Coin, CoinKind, DjedContracts, MaxAmount, TradeKind, TxPhase, UnsignedTx,
};
use djed_client::error::{DjedError, Result};
use djed_client::ports::{ChainReader, WalletGateway};
use djed_client::usecases::{
    plan_trade, ContractRegistry, DjedClient, MarketMonitor, MarketReader, PollEvent,
    TradeExecutor, TradeQuoter, TxBuilder, TxSubmitter,
};

// ---- Mock Definitions ----

mock! {
    pub Chain {}

    #[async_trait::async_trait]
    impl ChainReader for Chain {
        async fn call(&self, to: Address, input: Bytes) -> Result<Bytes>;
        async fn native_balance(&self, account: Address) -> Result<U256>;
        async fn receipt_status(&self, hash: TxHash) -> Result<Option<bool>>;
        async fn chain_id(&self) -> Result<u64>;
    }
}

mock! {
    pub Wallet {}

    #[async_trait::async_trait]
    impl WalletGateway for Wallet {
        async fn accounts(&self) -> Result<Vec<Address>>;
        async fn send_transaction(&self, tx: &UnsignedTx) -> Result<TxHash>;
    }
}

// ---- Fixtures ----

const DJED: Address = Address::repeat_byte(0xd1);
const ORACLE: Address = Address::repeat_byte(0x0c);
const SC: Address = Address::repeat_byte(0x5c);
const RC: Address = Address::repeat_byte(0x7c);
const ACCOUNT: Address = Address::repeat_byte(0xac);
const HASH: TxHash = TxHash::repeat_byte(0x11);

const E18: u128 = 1_000_000_000_000_000_000;
const E24: u128 = 1_000_000_000_000_000_000_000_000;

type Table = Vec<(Address, [u8; 4], Bytes)>;

fn uint(v: u128) -> Bytes {
    U256::from(v).abi_encode().into()
}

fn boolean(v: bool) -> Bytes {
    v.abi_encode().into()
}

/// Node that answers calls from `table` and reverts anything else.
fn answering(table: Table) -> MockChain {
    let mut chain = MockChain::new();
    chain.expect_call().returning(move |to, input| {
        table
            .iter()
            .find(|(addr, selector, _)| *addr == to && input.starts_with(selector))
            .map(|(_, _, out)| out.clone())
            .ok_or_else(|| DjedError::rpc("eth_call", "execution reverted"))
    });
    chain
}

/// Node that must not be called at all.
fn silent() -> MockChain {
    let mut chain = MockChain::new();
    chain.expect_call().times(0);
    chain
}

fn contracts() -> DjedContracts {
    DjedContracts {
        djed: DJED,
        oracle: ORACLE,
        stable_coin: Coin {
            kind: CoinKind::StableCoin,
            address: SC,
            decimals: 6,
        },
        reserve_coin: Coin {
            kind: CoinKind::ReserveCoin,
            address: RC,
            decimals: 6,
        },
    }
}

fn scaling() -> ScalingConfig {
    ScalingConfig {
        bc_decimals: 18,
        scaling_decimals: 24,
    }
}

fn quoter(chain: MockChain) -> TradeQuoter<MockChain> {
    TradeQuoter::new(Arc::new(chain), contracts(), scaling())
}

fn account(balance_sc: u128, balance_rc: u128) -> AccountDetails {
    AccountDetails {
        account: ACCOUNT,
        scaled_balance_sc: String::new(),
        unscaled_balance_sc: U256::from(balance_sc),
        scaled_balance_rc: String::new(),
        unscaled_balance_rc: U256::from(balance_rc),
        scaled_balance_bc: String::new(),
    }
}

fn market_table() -> Table {
    vec![
        (SC, IDjedCoin::totalSupplyCall::SELECTOR, uint(1_000_000_000)),
        (RC, IDjedCoin::totalSupplyCall::SELECTOR, uint(500_000)),
        (DJED, IDjed::getStableCoinWholeTargetPriceBCCall::SELECTOR, uint(2 * E18)),
        (DJED, IDjed::reserveBCCall::SELECTOR, uint(7_500 * E18 + E18 / 4)),
        (DJED, IDjed::getReserveRatioCall::SELECTOR, uint(4 * E24 + E24 / 2)),
        (DJED, IDjed::getReserveCoinWholeBuyPriceBCCall::SELECTOR, uint(3 * E18)),
        (DJED, IDjed::getReserveCoinWholeSellPriceBCCall::SELECTOR, uint(2 * E18 + 3 * E18 / 4)),
        (DJED, IDjed::reserveRatioMinCall::SELECTOR, uint(4 * E24)),
        (DJED, IDjed::reserveRatioMaxCall::SELECTOR, uint(8 * E24)),
        (DJED, IDjed::feeCall::SELECTOR, uint(15 * E24 / 1_000)),
        (DJED, IDjed::thresholdNumberSCCall::SELECTOR, uint(100_000_000)),
    ]
}

// ---- Contract Registry ----

#[tokio::test]
async fn test_registry_resolves_coins_and_decimals() {
    let chain = answering(vec![
        (DJED, IDjed::stableCoinCall::SELECTOR, SC.abi_encode().into()),
        (DJED, IDjed::reserveCoinCall::SELECTOR, RC.abi_encode().into()),
        (SC, IDjedCoin::decimalsCall::SELECTOR, uint(6)),
        (RC, IDjedCoin::decimalsCall::SELECTOR, uint(18)),
    ]);
    let registry = ContractRegistry::new(Arc::new(chain));

    let resolved = registry.resolve(DJED, ORACLE).await.unwrap();

    assert_eq!(resolved.djed, DJED);
    assert_eq!(resolved.oracle, ORACLE);
    assert_eq!(resolved.stable_coin.address, SC);
    assert_eq!(resolved.stable_coin.decimals, 6);
    assert_eq!(resolved.reserve_coin.address, RC);
    assert_eq!(resolved.reserve_coin.decimals, 18);
}

#[tokio::test]
async fn test_registry_failure_names_the_method() {
    let chain = answering(vec![(DJED, IDjed::stableCoinCall::SELECTOR, SC.abi_encode().into())]);
    let registry = ContractRegistry::new(Arc::new(chain));

    let err = registry.resolve(DJED, ORACLE).await.unwrap_err();

    match err {
        DjedError::RpcRead { method, .. } => assert_eq!(method, "reserveCoin()"),
        other => panic!("expected RpcRead, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_connect_resolves_deployment() {
    let chain = answering(vec![
        (DJED, IDjed::stableCoinCall::SELECTOR, SC.abi_encode().into()),
        (DJED, IDjed::reserveCoinCall::SELECTOR, RC.abi_encode().into()),
        (SC, IDjedCoin::decimalsCall::SELECTOR, uint(6)),
        (RC, IDjedCoin::decimalsCall::SELECTOR, uint(6)),
    ]);
    let config = ContractConfig {
        djed: DJED,
        oracle: ORACLE,
    };

    let client = DjedClient::connect(Arc::new(chain), &config, scaling()).await.unwrap();

    assert_eq!(*client.contracts(), contracts());
    let tx = client.tx_builder().buy_sc_tx(ACCOUNT, U256::from(1u8));
    assert_eq!(tx.to, DJED);
}

// ---- Market Data ----

#[tokio::test]
async fn test_coin_details_scales_each_figure() {
    let market = MarketReader::new(Arc::new(answering(market_table())), contracts(), scaling());

    let details = market.get_coin_details().await.unwrap();

    assert_eq!(details.scaled_number_sc, "1000.0");
    assert_eq!(details.unscaled_number_sc, U256::from(1_000_000_000u64));
    assert_eq!(details.scaled_price_sc, "2.0");
    assert_eq!(details.scaled_number_rc, "0.5");
    assert_eq!(details.scaled_reserve_bc, "7500.25");
    assert_eq!(details.percent_reserve_ratio, "450.0000%");
    assert_eq!(details.scaled_buy_price_rc, "3.0");
    assert_eq!(details.scaled_sell_price_rc, "2.75");
}

#[tokio::test]
async fn test_system_params_use_protocol_precision() {
    let market = MarketReader::new(Arc::new(answering(market_table())), contracts(), scaling());

    let params = market.get_system_params().await.unwrap();

    assert_eq!(params.reserve_ratio_min, "4.0");
    assert_eq!(params.reserve_ratio_max, "8.0");
    assert_eq!(params.fee, "0.015");
    assert_eq!(params.threshold_number_sc, U256::from(100_000_000u64));
}

#[tokio::test]
async fn test_account_details_reads_three_balances() {
    let mut chain = answering(vec![
        (SC, IDjedCoin::balanceOfCall::SELECTOR, uint(2_500_000)),
        (RC, IDjedCoin::balanceOfCall::SELECTOR, uint(0)),
    ]);
    chain
        .expect_native_balance()
        .with(eq(ACCOUNT))
        .times(1)
        .returning(|_| Ok(U256::from(E18 / 10)));
    let market = MarketReader::new(Arc::new(chain), contracts(), scaling());

    let details = market.get_account_details(ACCOUNT).await.unwrap();

    assert_eq!(details.account, ACCOUNT);
    assert_eq!(details.scaled_balance_sc, "2.5");
    assert_eq!(details.unscaled_balance_sc, U256::from(2_500_000u64));
    assert_eq!(details.scaled_balance_rc, "0.0");
    assert_eq!(details.scaled_balance_bc, "0.1");
}

#[tokio::test]
async fn test_oracle_exchange_rate_reads_oracle_contract() {
    let chain = answering(vec![(ORACLE, IOracle::exchangeRateCall::SELECTOR, uint(E18 / 2))]);
    let market = MarketReader::new(Arc::new(chain), contracts(), scaling());

    assert_eq!(market.get_oracle_exchange_rate().await.unwrap(), "0.5");
}

#[tokio::test]
async fn test_coin_details_fails_when_any_read_fails() {
    let mut table = market_table();
    table.retain(|(_, selector, _)| *selector != IDjed::reserveBCCall::SELECTOR);
    let market = MarketReader::new(Arc::new(answering(table)), contracts(), scaling());

    let err = market.get_coin_details().await.unwrap_err();

    assert!(matches!(err, DjedError::RpcRead { ref method, .. } if method == "reserveBC()"));
}

// ---- Trade Quoter ----

#[tokio::test]
async fn test_quote_prices_exact_amount() {
    let chain = answering(vec![(
        DJED,
        IDjed::getPriceBuyNReserveCoinsBCCall::SELECTOR,
        uint(3 * E18 + E18 / 2),
    )]);

    let quote = quoter(chain).trade_data_price_buy_rc("1.5").await.unwrap();

    assert_eq!(quote.kind, TradeKind::BuyReserveCoin);
    assert_eq!(quote.amount_scaled, "1.5");
    assert_eq!(quote.amount_unscaled, U256::from(1_500_000u64));
    assert_eq!(quote.total_scaled, "3.5");
}

#[tokio::test]
async fn test_quote_sends_unscaled_amount_to_price_function() {
    let mut chain = MockChain::new();
    chain.expect_call().times(1).returning(|to, input| {
        assert_eq!(to, DJED);
        let decoded = IDjed::getPriceSellNStableCoinsBCCall::abi_decode(&input, true).unwrap();
        assert_eq!(decoded.amountSC, U256::from(12_340_000u64));
        Ok(uint(E18))
    });

    let quote = quoter(chain).trade_data_price_sell_sc("12.34").await.unwrap();
    assert_eq!(quote.total_scaled, "1.0");
}

#[tokio::test]
async fn test_zero_amount_quote_is_zero() {
    let chain = answering(vec![(DJED, IDjed::getPriceBuyNStableCoinsBCCall::SELECTOR, uint(0))]);

    let quote = quoter(chain).trade_data_price_buy_sc("0").await.unwrap();

    assert_eq!(quote.amount_unscaled, U256::ZERO);
    assert_eq!(quote.total_scaled, "0.0");
}

#[tokio::test]
async fn test_failed_price_read_names_the_full_signature() {
    let err = quoter(answering(vec![]))
        .trade_data_price_buy_rc("1.0")
        .await
        .unwrap_err();

    match err {
        DjedError::RpcRead { method, .. } => assert_eq!(method, "getPriceBuyNReserveCoinsBC(uint256)"),
        other => panic!("expected RpcRead, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_price_names_the_full_signature() {
    let chain = answering(vec![(
        DJED,
        IDjed::getPriceSellNStableCoinsBCCall::SELECTOR,
        Bytes::from_static(&[0x01, 0x02]),
    )]);

    let err = quoter(chain).trade_data_price_sell_sc("1.0").await.unwrap_err();

    assert!(matches!(
        err,
        DjedError::Decode { ref method, .. } if method == "getPriceSellNStableCoinsBC(uint256)"
    ));
}

#[tokio::test]
async fn test_quote_rejects_garbage_before_reading() {
    let err = quoter(silent()).trade_data_price_sell_rc("1,5").await.unwrap_err();
    assert!(matches!(err, DjedError::InvalidAmount { .. }));
}

#[tokio::test]
async fn test_max_buy_rc_unlimited_below_threshold() {
    let max = quoter(silent())
        .get_max_buy_rc(U256::from(99u8), U256::from(100u8))
        .await
        .unwrap();

    assert_eq!(max, MaxAmount::Unlimited);
    assert_eq!(max.as_str(), "");
}

#[tokio::test]
async fn test_max_buy_rc_reads_protocol_at_threshold() {
    let chain = answering(vec![(DJED, IDjed::getMaxBuyableReserveCoinsCall::SELECTOR, uint(4_200_000))]);

    let max = quoter(chain)
        .get_max_buy_rc(U256::from(100u8), U256::from(100u8))
        .await
        .unwrap();

    assert_eq!(max, MaxAmount::Limited("4.2".into()));
}

#[tokio::test]
async fn test_max_sell_rc_is_capped_by_balance() {
    let table = || vec![(DJED, IDjed::getMaxSellableReserveCoinsCall::SELECTOR, uint(5_000_000))];

    let below = quoter(answering(table())).get_max_sell_rc(U256::from(2_000_000u64)).await.unwrap();
    assert_eq!(below, "2.0");

    let above = quoter(answering(table())).get_max_sell_rc(U256::from(9_000_000u64)).await.unwrap();
    assert_eq!(above, "5.0");
}

#[tokio::test]
async fn test_max_amount_routes_by_kind() {
    let chain = answering(vec![(DJED, IDjed::getMaxBuyableStableCoinsCall::SELECTOR, uint(7_000_000))]);
    let quoter = quoter(chain);
    let mut holder = account(3_000_000, 0);
    holder.scaled_balance_sc = "3.0".into();

    let buy = quoter
        .max_amount(TradeKind::BuyStableCoin, U256::ZERO, U256::ZERO, &holder)
        .await
        .unwrap();
    assert_eq!(buy, MaxAmount::Limited("7.0".into()));

    let sell = quoter
        .max_amount(TradeKind::SellStableCoin, U256::ZERO, U256::ZERO, &holder)
        .await
        .unwrap();
    assert_eq!(sell, MaxAmount::Limited("3.0".into()));
}

#[tokio::test]
async fn test_check_sellable_rc_above_balance_skips_protocol() {
    let sellable = quoter(silent())
        .check_sellable_rc(U256::from(11u8), U256::from(10u8))
        .await
        .unwrap();
    assert!(!sellable);
}

#[tokio::test]
async fn test_check_sellable_rc_within_balance_asks_protocol() {
    let chain = answering(vec![(DJED, IDjed::checkSellableNReserveCoinsCall::SELECTOR, boolean(true))]);

    let sellable = quoter(chain)
        .check_sellable_rc(U256::from(10u8), U256::from(10u8))
        .await
        .unwrap();
    assert!(sellable);
}

// ---- Transactions ----

#[tokio::test]
async fn test_promise_tx_without_accounts_never_reaches_wallet() {
    let mut wallet = MockWallet::new();
    wallet.expect_send_transaction().times(0);
    let submitter = TxSubmitter::new(Arc::new(silent()), Arc::new(wallet), Duration::ZERO);
    let tx = TxBuilder::new(DJED).buy_sc_tx(ACCOUNT, U256::from(1u8));

    let err = submitter.promise_tx(&[], &tx).await.unwrap_err();

    assert!(matches!(err, DjedError::NoAccountConnected));
}

#[tokio::test]
async fn test_verify_tx_without_receipt_is_unavailable() {
    let mut chain = MockChain::new();
    chain
        .expect_receipt_status()
        .with(eq(HASH))
        .times(1)
        .returning(|_| Ok(None));
    let submitter = TxSubmitter::new(Arc::new(chain), Arc::new(MockWallet::new()), Duration::ZERO);

    let err = submitter.verify_tx(HASH).await.unwrap_err();

    assert!(matches!(err, DjedError::ReceiptUnavailable { hash, waited_ms: 0 } if hash == HASH));
}

#[tokio::test]
async fn test_verify_tx_waits_for_confirmation_delay() {
    let mut chain = MockChain::new();
    chain
        .expect_receipt_status()
        .times(1)
        .returning(|_| Ok(Some(true)));
    let submitter = TxSubmitter::new(
        Arc::new(chain),
        Arc::new(MockWallet::new()),
        Duration::from_millis(20),
    );

    let mut verify = tokio_test::task::spawn(submitter.verify_tx(HASH));
    tokio_test::assert_pending!(verify.poll());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let status = tokio_test::assert_ready_ok!(verify.poll());
    assert!(status);
}

#[tokio::test]
async fn test_executor_publishes_pending_then_success() {
    let mut chain = MockChain::new();
    chain.expect_receipt_status().returning(|_| Ok(Some(true)));
    let mut wallet = MockWallet::new();
    wallet
        .expect_send_transaction()
        .withf(|tx| tx.to == DJED && tx.from == ACCOUNT)
        .times(1)
        .returning(|_| Ok(HASH));
    let executor = TradeExecutor::new(TxSubmitter::new(Arc::new(chain), Arc::new(wallet), Duration::ZERO));
    let mut phases = executor.subscribe();
    let tx = TxBuilder::new(DJED).sell_rc_tx(ACCOUNT, U256::from(5u8));

    let phase = executor.execute(&[ACCOUNT], &tx).await.unwrap();

    assert_eq!(phase, TxPhase::Success { hash: HASH });
    assert_eq!(executor.phase(), TxPhase::Success { hash: HASH });
    assert!(phases.has_changed().unwrap());
    assert_eq!(*phases.borrow_and_update(), TxPhase::Success { hash: HASH });
}

#[tokio::test]
async fn test_executor_reverted_receipt_is_failure() {
    let mut chain = MockChain::new();
    chain.expect_receipt_status().returning(|_| Ok(Some(false)));
    let mut wallet = MockWallet::new();
    wallet.expect_send_transaction().returning(|_| Ok(HASH));
    let executor = TradeExecutor::new(TxSubmitter::new(Arc::new(chain), Arc::new(wallet), Duration::ZERO));
    let tx = TxBuilder::new(DJED).buy_rc_tx(ACCOUNT, U256::from(5u8));

    let phase = executor.execute(&[ACCOUNT], &tx).await.unwrap();

    assert!(matches!(phase, TxPhase::Failure { hash: Some(h), .. } if h == HASH));
    assert_eq!(phase.title(), "Failed transaction!");
}

#[tokio::test]
async fn test_executor_rejection_fails_and_next_trade_resets() {
    let mut chain = MockChain::new();
    chain.expect_receipt_status().returning(|_| Ok(Some(true)));
    let mut wallet = MockWallet::new();
    let mut calls = 0;
    wallet.expect_send_transaction().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Err(DjedError::WalletRequestRejected("user denied".into()))
        } else {
            Ok(HASH)
        }
    });
    let executor = TradeExecutor::new(TxSubmitter::new(Arc::new(chain), Arc::new(wallet), Duration::ZERO));
    let tx = TxBuilder::new(DJED).buy_rc_tx(ACCOUNT, U256::from(5u8));

    let err = executor.execute(&[ACCOUNT], &tx).await.unwrap_err();
    assert!(matches!(err, DjedError::WalletRequestRejected(_)));
    assert!(matches!(executor.phase(), TxPhase::Failure { hash: None, .. }));

    let phase = executor.execute(&[ACCOUNT], &tx).await.unwrap();
    assert_eq!(phase, TxPhase::Success { hash: HASH });
}

#[tokio::test]
async fn test_plan_trade_rejects_when_protocol_disallows() {
    let chain = answering(vec![
        (DJED, IDjed::getPriceBuyNStableCoinsBCCall::SELECTOR, uint(E18)),
        (DJED, IDjed::checkBuyableNStableCoinsCall::SELECTOR, boolean(false)),
    ]);

    let err = plan_trade(
        &quoter(chain),
        &TxBuilder::new(DJED),
        TradeKind::BuyStableCoin,
        "1.0",
        &account(0, 0),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DjedError::TradeNotAllowed { kind: TradeKind::BuyStableCoin, .. }));
}

#[tokio::test]
async fn test_plan_trade_builds_buy_with_quoted_value() {
    let chain = answering(vec![
        (DJED, IDjed::getPriceBuyNReserveCoinsBCCall::SELECTOR, uint(2 * E18)),
        (DJED, IDjed::checkBuyableNReserveCoinsCall::SELECTOR, boolean(true)),
    ]);

    let (quote, tx) = plan_trade(
        &quoter(chain),
        &TxBuilder::new(DJED),
        TradeKind::BuyReserveCoin,
        "4",
        &account(0, 0),
    )
    .await
    .unwrap();

    assert_eq!(quote.total_scaled, "2.0");
    assert_eq!(tx.from, ACCOUNT);
    assert_eq!(tx.value, U256::from(2 * E18));
    assert_eq!(&tx.data[..], IDjed::buyReserveCoinsCall::SELECTOR.as_slice());
}

#[tokio::test]
async fn test_plan_trade_sell_sc_beyond_balance_needs_no_protocol_check() {
    let chain = answering(vec![(DJED, IDjed::getPriceSellNStableCoinsBCCall::SELECTOR, uint(E18))]);

    let err = plan_trade(
        &quoter(chain),
        &TxBuilder::new(DJED),
        TradeKind::SellStableCoin,
        "2.0",
        &account(1_000_000, 0),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DjedError::TradeNotAllowed { .. }));
}

// ---- Market Monitor ----

#[tokio::test]
async fn test_monitor_reports_failed_poll() {
    let market = MarketReader::new(Arc::new(answering(Vec::new())), contracts(), scaling());
    let (_shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let monitor = MarketMonitor::new(market, Duration::from_secs(60), shutdown_rx);

    let event = monitor.poll_once().await;

    assert!(!event.is_ok());
    assert!(matches!(event, PollEvent::Failed { .. }));
}

#[tokio::test]
async fn test_monitor_polls_until_shutdown() {
    let market = MarketReader::new(Arc::new(answering(market_table())), contracts(), scaling());
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let monitor = MarketMonitor::new(market, Duration::from_millis(50), shutdown_rx);
    let (events_tx, mut events_rx) = mpsc::channel(16);

    let handle = tokio::spawn(monitor.run(events_tx));

    let first = events_rx.recv().await.unwrap();
    match first {
        PollEvent::Ok { coin_details, system_params } => {
            assert_eq!(coin_details.percent_reserve_ratio, "450.0000%");
            assert_eq!(system_params.fee, "0.015");
        }
        PollEvent::Failed { reason } => panic!("poll failed: {reason}"),
    }

    shutdown_tx.send(()).unwrap();
    let polls = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(polls >= 1);
}
