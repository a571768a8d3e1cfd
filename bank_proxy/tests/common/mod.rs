#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use bank_proxy::{
    cosmos_sdk_proto::cosmos::{
        bank::v1beta1::{self as bank, DenomOwner, DenomUnit, Metadata, Params, SendEnabled},
        base::v1beta1::Coin as ProtoCoin,
    },
    error::{GrpcError, ProxyError},
    grpc::{BankService, Connector},
};
use tonic::Status;

pub const DENOM: &str = "uatom";
pub const ALICE: &str = "cosmos1j5f60735tg604tjd0ts7z22hsmva6nznz8na6q";
pub const BOB: &str = "cosmos154d0p9xhrruhxvazumej9nq29afeura2alje4u";

pub fn init_tokio_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Could not build tokio runtime")
}

pub fn init_multi_thread_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("Could not build tokio runtime")
}

pub fn coin(amount: u128, denom: &str) -> ProtoCoin {
    ProtoCoin {
        amount: amount.to_string(),
        denom: denom.to_string(),
    }
}

/// What the fake bank module knows about
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    pub balances: Vec<(String, ProtoCoin)>,
    pub metadata: Vec<Metadata>,
    pub params: Option<Params>,
    pub send_enabled: Vec<SendEnabled>,
}

impl Ledger {
    fn balance(&self, address: &str, denom: &str) -> Option<ProtoCoin> {
        self.balances
            .iter()
            .find(|(a, c)| a == address && c.denom == denom)
            .map(|(_, c)| c.clone())
    }

    fn balances_of(&self, address: &str) -> Vec<ProtoCoin> {
        self.balances
            .iter()
            .filter(|(a, _)| a == address)
            .map(|(_, c)| c.clone())
            .collect()
    }

    fn supply(&self) -> BTreeMap<String, u128> {
        let mut supply = BTreeMap::new();
        for (_, c) in &self.balances {
            let amount: u128 = c.amount.parse().expect("bad amount in ledger");
            *supply.entry(c.denom.clone()).or_insert(0) += amount;
        }

        supply
    }

    fn metadata_for(&self, denom: &str) -> Result<Metadata, Status> {
        self.metadata
            .iter()
            .find(|m| m.base == denom)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("client metadata for denom {}", denom)))
    }
}

pub fn sample_ledger() -> Ledger {
    Ledger {
        balances: vec![
            (ALICE.to_string(), coin(1000, DENOM)),
            (ALICE.to_string(), coin(25, "ustake")),
            (BOB.to_string(), coin(500, DENOM)),
        ],
        metadata: vec![Metadata {
            description: "The native staking token of the Cosmos Hub.".to_string(),
            denom_units: vec![
                DenomUnit {
                    denom: DENOM.to_string(),
                    exponent: 0,
                    ..Default::default()
                },
                DenomUnit {
                    denom: "atom".to_string(),
                    exponent: 6,
                    ..Default::default()
                },
            ],
            base: DENOM.to_string(),
            display: "atom".to_string(),
            name: "Cosmos Hub Atom".to_string(),
            symbol: "ATOM".to_string(),
            ..Default::default()
        }],
        params: Some(Params {
            default_send_enabled: true,
            ..Default::default()
        }),
        send_enabled: vec![
            SendEnabled {
                denom: DENOM.to_string(),
                enabled: true,
            },
            SendEnabled {
                denom: "ustake".to_string(),
                enabled: false,
            },
        ],
    }
}

/// Shared state behind every connection a [`FakeConnector`] hands out
#[derive(Debug, Default)]
pub struct FakeState {
    pub ledger: Ledger,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub calls: AtomicUsize,
    /// Every request received, rendered as `<method> <args>`
    pub requests: Mutex<Vec<String>>,
    /// Each call sleeps this long before answering
    pub delay: Option<Duration>,
    /// Each call fails with this status instead of answering
    pub failure: Option<Status>,
    pub refuse_connections: bool,
}

impl FakeState {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[derive(Clone, Debug)]
pub struct FakeConnector {
    pub state: Arc<FakeState>,
}

impl FakeConnector {
    pub fn new(state: FakeState) -> Self {
        FakeConnector {
            state: Arc::new(state),
        }
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        FakeConnector::new(FakeState {
            ledger,
            ..FakeState::default()
        })
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Connection = FakeConnection;

    async fn connect(&self, endpoint: &str) -> Result<FakeConnection, ProxyError> {
        if self.state.refuse_connections {
            return Err(GrpcError::InvalidEndpoint(format!("{} refused connection", endpoint)).into());
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);

        Ok(FakeConnection {
            state: self.state.clone(),
        })
    }
}

#[derive(Debug)]
pub struct FakeConnection {
    state: Arc<FakeState>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl FakeConnection {
    async fn serve<T, F>(&self, request: String, answer: F) -> Result<T, Status>
    where
        F: FnOnce(&Ledger) -> Result<T, Status> + Send,
    {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.requests.lock().unwrap().push(request);

        if let Some(delay) = self.state.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = &self.state.failure {
            return Err(status.clone());
        }

        answer(&self.state.ledger)
    }
}

#[async_trait]
impl BankService for FakeConnection {
    async fn balance(
        &mut self,
        request: bank::QueryBalanceRequest,
    ) -> Result<bank::QueryBalanceResponse, Status> {
        let record = format!("balance {} {}", request.address, request.denom);
        self.serve(record, move |ledger| {
            if request.address.is_empty() {
                return Err(Status::invalid_argument("empty address string is not allowed"));
            }
            Ok(bank::QueryBalanceResponse {
                balance: ledger.balance(&request.address, &request.denom),
            })
        })
        .await
    }

    async fn all_balances(
        &mut self,
        request: bank::QueryAllBalancesRequest,
    ) -> Result<bank::QueryAllBalancesResponse, Status> {
        let record = format!("all_balances {}", request.address);
        self.serve(record, move |ledger| {
            Ok(bank::QueryAllBalancesResponse {
                balances: ledger.balances_of(&request.address),
                ..Default::default()
            })
        })
        .await
    }

    async fn spendable_balances(
        &mut self,
        request: bank::QuerySpendableBalancesRequest,
    ) -> Result<bank::QuerySpendableBalancesResponse, Status> {
        let record = format!("spendable_balances {}", request.address);
        self.serve(record, move |ledger| {
            Ok(bank::QuerySpendableBalancesResponse {
                balances: ledger.balances_of(&request.address),
                ..Default::default()
            })
        })
        .await
    }

    async fn spendable_balance_by_denom(
        &mut self,
        request: bank::QuerySpendableBalanceByDenomRequest,
    ) -> Result<bank::QuerySpendableBalanceByDenomResponse, Status> {
        let record = format!(
            "spendable_balance_by_denom {} {}",
            request.address, request.denom
        );
        self.serve(record, move |ledger| {
            Ok(bank::QuerySpendableBalanceByDenomResponse {
                balance: ledger.balance(&request.address, &request.denom),
            })
        })
        .await
    }

    async fn total_supply(
        &mut self,
        _request: bank::QueryTotalSupplyRequest,
    ) -> Result<bank::QueryTotalSupplyResponse, Status> {
        self.serve("total_supply".to_string(), |ledger| {
            Ok(bank::QueryTotalSupplyResponse {
                supply: ledger
                    .supply()
                    .into_iter()
                    .map(|(denom, amount)| coin(amount, &denom))
                    .collect(),
                ..Default::default()
            })
        })
        .await
    }

    async fn supply_of(
        &mut self,
        request: bank::QuerySupplyOfRequest,
    ) -> Result<bank::QuerySupplyOfResponse, Status> {
        let record = format!("supply_of {}", request.denom);
        self.serve(record, move |ledger| {
            Ok(bank::QuerySupplyOfResponse {
                amount: ledger
                    .supply()
                    .get(&request.denom)
                    .map(|amount| coin(*amount, &request.denom)),
            })
        })
        .await
    }

    async fn params(
        &mut self,
        _request: bank::QueryParamsRequest,
    ) -> Result<bank::QueryParamsResponse, Status> {
        self.serve("params".to_string(), |ledger| {
            Ok(bank::QueryParamsResponse {
                params: ledger.params.clone(),
            })
        })
        .await
    }

    async fn denom_metadata(
        &mut self,
        request: bank::QueryDenomMetadataRequest,
    ) -> Result<bank::QueryDenomMetadataResponse, Status> {
        let record = format!("denom_metadata {}", request.denom);
        self.serve(record, move |ledger| {
            Ok(bank::QueryDenomMetadataResponse {
                metadata: Some(ledger.metadata_for(&request.denom)?),
            })
        })
        .await
    }

    async fn denom_metadata_by_query_string(
        &mut self,
        request: bank::QueryDenomMetadataByQueryStringRequest,
    ) -> Result<bank::QueryDenomMetadataByQueryStringResponse, Status> {
        let record = format!("denom_metadata_by_query_string {}", request.denom);
        self.serve(record, move |ledger| {
            Ok(bank::QueryDenomMetadataByQueryStringResponse {
                metadata: Some(ledger.metadata_for(&request.denom)?),
            })
        })
        .await
    }

    async fn denoms_metadata(
        &mut self,
        _request: bank::QueryDenomsMetadataRequest,
    ) -> Result<bank::QueryDenomsMetadataResponse, Status> {
        self.serve("denoms_metadata".to_string(), |ledger| {
            Ok(bank::QueryDenomsMetadataResponse {
                metadatas: ledger.metadata.clone(),
                ..Default::default()
            })
        })
        .await
    }

    async fn denom_owners(
        &mut self,
        request: bank::QueryDenomOwnersRequest,
    ) -> Result<bank::QueryDenomOwnersResponse, Status> {
        let record = format!("denom_owners {}", request.denom);
        self.serve(record, move |ledger| {
            Ok(bank::QueryDenomOwnersResponse {
                denom_owners: ledger
                    .balances
                    .iter()
                    .filter(|(_, c)| c.denom == request.denom)
                    .map(|(address, c)| DenomOwner {
                        address: address.clone(),
                        balance: Some(c.clone()),
                    })
                    .collect(),
                ..Default::default()
            })
        })
        .await
    }

    async fn send_enabled(
        &mut self,
        request: bank::QuerySendEnabledRequest,
    ) -> Result<bank::QuerySendEnabledResponse, Status> {
        let record = format!("send_enabled {}", request.denoms.join(","));
        self.serve(record, move |ledger| {
            Ok(bank::QuerySendEnabledResponse {
                send_enabled: ledger
                    .send_enabled
                    .iter()
                    .filter(|s| request.denoms.is_empty() || request.denoms.contains(&s.denom))
                    .cloned()
                    .collect(),
                ..Default::default()
            })
        })
        .await
    }
}
