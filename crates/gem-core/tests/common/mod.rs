//! In-memory collaborators and account fixtures shared by the integration
//! tests.
//!
//! `MockLedger` plays the ledger: it stores raw account data and executes
//! submitted transactions atomically. A transaction touching a "poisoned"
//! account is rejected as a whole and none of its instructions are applied.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gem_core::{
    Address, GemClient, GemConfig, GemError, Keypair, LedgerReader, MetadataService,
    PositionClass, PriceFeeds, Signature, TokenMetadata, TokenRecord, WalletCapability,
};
use gem_sol::Transaction;
use tokio::time::Instant;

pub const PROGRAM_ID: Address = Address::new([0x6d; 32]);

pub fn config() -> GemConfig {
    GemConfig {
        program_id: PROGRAM_ID,
        protocol_share: 50,
        mint_compute_units: 240_000,
        claim_compute_units: 400_000,
        imprint_delay_secs: 20,
        confirmation_timeout_secs: 60,
        price_feeds: PriceFeeds {
            btc: Address::new([0xF1; 32]),
            sol: Address::new([0xF2; 32]),
            eth: Address::new([0xF3; 32]),
            bnb: Address::new([0xF4; 32]),
        },
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// An instruction the mock ledger applied, with its account keys resolved.
#[derive(Debug, Clone)]
pub struct Applied {
    pub program_id: Address,
    pub data: Vec<u8>,
    pub accounts: Vec<Address>,
}

#[derive(Default)]
pub struct ChainState {
    pub accounts: HashMap<Address, Vec<u8>>,
    pub poisoned: HashSet<Address>,
    pub outcomes: HashMap<Signature, Result<(), String>>,
    pub submitted: Vec<(Instant, Transaction)>,
    pub confirmed: Vec<(Instant, Signature)>,
    pub applied: Vec<Applied>,
    pub reads: HashMap<Address, usize>,
    pub confirm_hangs: bool,
    pub recency_unavailable: bool,
    pub sends_dropped: bool,
}

#[derive(Default)]
pub struct MockLedger {
    pub state: Mutex<ChainState>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put_account(&self, address: Address, data: Vec<u8>) {
        self.state.lock().unwrap().accounts.insert(address, data);
    }

    pub fn poison(&self, address: Address) {
        self.state.lock().unwrap().poisoned.insert(address);
    }

    pub fn hang_confirmations(&self) {
        self.state.lock().unwrap().confirm_hangs = true;
    }

    /// Fail every recency token fetch with a transport error.
    pub fn take_recency_offline(&self) {
        self.state.lock().unwrap().recency_unavailable = true;
    }

    /// Drop every submitted transaction with a transport error.
    pub fn drop_sends(&self) {
        self.state.lock().unwrap().sends_dropped = true;
    }

    pub fn reads_of(&self, address: &Address) -> usize {
        self.state.lock().unwrap().reads.get(address).copied().unwrap_or(0)
    }

    pub fn applied(&self) -> Vec<Applied> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn submitted(&self) -> Vec<(Instant, Transaction)> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn confirmed(&self) -> Vec<(Instant, Signature)> {
        self.state.lock().unwrap().confirmed.clone()
    }

    /// Execute all instructions or none.
    fn execute(&self, tx: &Transaction) -> Result<Signature, GemError> {
        tx.verify_signatures()
            .map_err(|e| GemError::ProtocolRejected(e.to_string()))?;
        let signature = tx
            .signature()
            .ok_or_else(|| GemError::ProtocolRejected("unsigned".into()))?;
        if self.state.lock().unwrap().sends_dropped {
            return Err(GemError::TransportFailure("connection reset".into()));
        }

        let keys = &tx.message.account_keys;
        let resolved: Vec<Applied> = tx
            .message
            .instructions
            .iter()
            .map(|ix| Applied {
                program_id: keys[ix.program_id_index as usize],
                data: ix.data.clone(),
                accounts: ix.account_indices.iter().map(|i| keys[*i as usize]).collect(),
            })
            .collect();

        let mut state = self.state.lock().unwrap();
        state.submitted.push((Instant::now(), tx.clone()));

        let poisoned = resolved
            .iter()
            .flat_map(|ix| ix.accounts.iter())
            .find(|a| state.poisoned.contains(*a))
            .copied();

        let outcome = match poisoned {
            Some(account) => Err(format!("instruction failed on {account}")),
            None => {
                state.applied.extend(resolved);
                Ok(())
            }
        };
        state.outcomes.insert(signature, outcome);
        Ok(signature)
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn get_account_info(&self, address: &Address) -> Result<Option<Vec<u8>>, GemError> {
        let mut state = self.state.lock().unwrap();
        *state.reads.entry(*address).or_default() += 1;
        Ok(state.accounts.get(address).cloned())
    }

    async fn get_latest_recency_token(&self) -> Result<[u8; 32], GemError> {
        if self.state.lock().unwrap().recency_unavailable {
            return Err(GemError::TransportFailure("rpc unreachable".into()));
        }
        Ok([0xB7; 32])
    }

    async fn confirm(&self, signature: &Signature) -> Result<(), GemError> {
        let (hang, outcome) = {
            let state = self.state.lock().unwrap();
            (state.confirm_hangs, state.outcomes.get(signature).cloned())
        };
        if hang {
            std::future::pending::<()>().await;
        }
        match outcome {
            Some(Ok(())) => {
                self.state
                    .lock()
                    .unwrap()
                    .confirmed
                    .push((Instant::now(), *signature));
                Ok(())
            }
            Some(Err(msg)) => Err(GemError::ProtocolRejected(msg)),
            None => Err(GemError::TransportFailure("unknown signature".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

pub struct MockWallet {
    pub keypair: Option<Keypair>,
    pub reject: bool,
    pub ledger: Arc<MockLedger>,
}

impl MockWallet {
    pub fn connected(ledger: Arc<MockLedger>) -> Arc<Self> {
        Arc::new(Self {
            keypair: Some(Keypair::from_seed(&[0x77; 32])),
            reject: false,
            ledger,
        })
    }

    pub fn rejecting(ledger: Arc<MockLedger>) -> Arc<Self> {
        Arc::new(Self {
            keypair: Some(Keypair::from_seed(&[0x77; 32])),
            reject: true,
            ledger,
        })
    }

    pub fn disconnected(ledger: Arc<MockLedger>) -> Arc<Self> {
        Arc::new(Self {
            keypair: None,
            reject: false,
            ledger,
        })
    }
}

#[async_trait]
impl WalletCapability for MockWallet {
    fn public_key(&self) -> Option<Address> {
        self.keypair.as_ref().map(Keypair::pubkey)
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, GemError> {
        if self.reject {
            return Err(GemError::SignatureRejected("user declined".into()));
        }
        let keypair = self.keypair.as_ref().ok_or(GemError::WalletNotConnected)?;
        transaction.partial_sign(keypair)?;
        Ok(transaction)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, GemError> {
        self.ledger.execute(transaction)
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockMetadata {
    pub tokens: Mutex<Vec<TokenRecord>>,
    pub documents: Mutex<HashMap<Address, TokenMetadata>>,
}

impl MockMetadata {
    pub fn add(&self, mint: Address, collection: Option<Address>, class: PositionClass) {
        self.tokens.lock().unwrap().push(TokenRecord { mint, collection });
        let json = format!(
            r#"{{"image":"https://img/{mint}.png","attributes":[
                {{"trait_type":"Class","value":"{class}"}},
                {{"trait_type":"Generation","value":1}}]}}"#
        );
        self.documents
            .lock()
            .unwrap()
            .insert(mint, TokenMetadata::from_json(&json).unwrap());
    }
}

#[async_trait]
impl MetadataService for MockMetadata {
    async fn find_tokens_by_owner(&self, _owner: &Address) -> Result<Vec<TokenRecord>, GemError> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn load_metadata(&self, mint: &Address) -> Result<TokenMetadata, GemError> {
        self.documents
            .lock()
            .unwrap()
            .get(mint)
            .cloned()
            .ok_or_else(|| GemError::Metadata(format!("no metadata for {mint}")))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub ledger: Arc<MockLedger>,
    pub wallet: Arc<MockWallet>,
    pub metadata: Arc<MockMetadata>,
    pub client: GemClient,
}

impl Harness {
    pub fn new() -> Self {
        let ledger = MockLedger::new();
        Self::with_wallet(ledger.clone(), MockWallet::connected(ledger))
    }

    pub fn with_wallet(ledger: Arc<MockLedger>, wallet: Arc<MockWallet>) -> Self {
        let metadata = Arc::new(MockMetadata::default());
        let client = GemClient::new(config(), ledger.clone(), metadata.clone(), wallet.clone())
            .unwrap();
        Self {
            ledger,
            wallet,
            metadata,
            client,
        }
    }

    pub fn owner(&self) -> Address {
        self.wallet.public_key().unwrap()
    }

    /// Register a gem held by the wallet, in the protocol collection.
    pub fn add_gem(&self, mint: Address, account: Vec<u8>) {
        let collection = self.client.addresses().collection_mint;
        let class = PositionClass::try_from(account[1]).unwrap();
        self.metadata.add(mint, Some(collection), class);
        let state = self.client.addresses().gem_account(&mint).unwrap();
        self.ledger.put_account(state, account);
    }

    pub fn add_vote_data(&self, vote_account: Address, validator: Address, records: &[(u64, u64, u64)]) {
        let address = self.client.addresses().vote_data(&vote_account).unwrap();
        self.ledger.put_account(address, vote_data_bytes(validator, records));
    }
}

// ---------------------------------------------------------------------------
// Account fixtures
// ---------------------------------------------------------------------------

pub enum Funds {
    Unallocated,
    Pooled,
    Delegated(Address),
}

pub fn gem_bytes(class: PositionClass, last_delegation: u64, last_withdrawal: u64, funds: Funds) -> Vec<u8> {
    let mut v = vec![1u8, class.ordinal()];
    v.extend_from_slice(&1u32.to_le_bytes());
    v.extend_from_slice(&1_660_000_000u32.to_le_bytes());
    v.extend_from_slice(&[0, 0]);
    v.extend_from_slice(&[0, 0, 0, 0, 0]);
    v.extend_from_slice(&[0, 0, 0, 0, 0]);
    v.extend_from_slice(&last_delegation.to_le_bytes());
    v.extend_from_slice(&last_withdrawal.to_le_bytes());
    match funds {
        Funds::Unallocated => v.push(0),
        Funds::Pooled => v.push(1),
        Funds::Delegated(target) => {
            v.push(2);
            v.extend_from_slice(target.as_bytes());
        }
    }
    v
}

pub fn vote_data_bytes(validator: Address, records: &[(u64, u64, u64)]) -> Vec<u8> {
    let mut v = vec![2u8];
    v.extend_from_slice(validator.as_bytes());
    v.extend_from_slice(&(records.len() as u32).to_le_bytes());
    for (epoch, reward, stake) in records {
        v.extend_from_slice(&epoch.to_le_bytes());
        v.extend_from_slice(&reward.to_le_bytes());
        v.extend_from_slice(&stake.to_le_bytes());
    }
    v
}

pub fn global_gems_bytes(proposal_numeration: u32) -> Vec<u8> {
    let mut v = vec![3u8];
    v.extend_from_slice(&12u32.to_le_bytes());
    v.extend_from_slice(&5_000u64.to_le_bytes());
    v.extend_from_slice(&proposal_numeration.to_le_bytes());
    v
}
