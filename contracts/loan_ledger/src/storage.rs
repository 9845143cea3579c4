use soroban_sdk::{contracttype, Address, Env};

// Constants
pub const SECONDS_PER_YEAR: u64 = 31_536_000; // 365 days, no leap adjustment
pub const MAX_RATE: u32 = 255; // Annual percent

/// A borrower's pending request, before any guarantor has locked collateral.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanRequest {
    /// Annualized rate in whole percent (0-255)
    pub rate: u32,
    /// Requested term in seconds, relative to activation
    pub duration: u64,
    /// Amount to disburse to the borrower
    pub principal: i128,
}

/// Identity of an active loan: the borrower and the second it was activated.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanKey {
    pub borrower: Address,
    pub activated_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveLoan {
    /// Annualized rate in whole percent, copied from the request
    pub rate: u32,
    /// Principal still outstanding
    pub principal: i128,
    /// Timestamp the guarantor activated the loan
    pub activated_at: u64,
    /// Absolute timestamp (activated_at + requested duration)
    pub deadline: u64,
    /// Who locked the collateral
    pub guarantor: Address,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Token,
    Request(Address), // Borrower → LoanRequest
    Loan(LoanKey),    // LoanKey → ActiveLoan
    Credit(Address),  // Identity → i128 score
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Initialized)
}

pub fn extend_instance(env: &Env) {
    let ttl = env.storage().max_ttl();
    env.storage().instance().extend_ttl(ttl, ttl);
}

pub fn read_token(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Token)
}

pub fn write_config(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::Initialized, &true);
    env.storage().instance().set(&DataKey::Token, token);
    extend_instance(env);
}

// ============================================
// REQUEST REGISTRY
// ============================================

pub fn has_request(env: &Env, borrower: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Request(borrower.clone()))
}

pub fn read_request(env: &Env, borrower: &Address) -> Option<LoanRequest> {
    let key = DataKey::Request(borrower.clone());
    let request = env.storage().persistent().get::<DataKey, LoanRequest>(&key)?;
    extend_entry(env, &key);
    Some(request)
}

pub fn write_request(env: &Env, borrower: &Address, request: &LoanRequest) {
    let key = DataKey::Request(borrower.clone());
    env.storage().persistent().set(&key, request);
    extend_entry(env, &key);
}

pub fn remove_request(env: &Env, borrower: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Request(borrower.clone()));
}

// ============================================
// ACTIVE LOAN TABLE
// ============================================

/// Zero principal counts as absent.
pub fn read_loan(env: &Env, key: &LoanKey) -> Option<ActiveLoan> {
    let key = DataKey::Loan(key.clone());
    let loan = env
        .storage()
        .persistent()
        .get::<DataKey, ActiveLoan>(&key)
        .filter(|loan| loan.principal > 0)?;
    extend_entry(env, &key);
    Some(loan)
}

pub fn write_loan(env: &Env, key: &LoanKey, loan: &ActiveLoan) {
    let key = DataKey::Loan(key.clone());
    env.storage().persistent().set(&key, loan);
    extend_entry(env, &key);
}

pub fn remove_loan(env: &Env, key: &LoanKey) {
    env.storage().persistent().remove(&DataKey::Loan(key.clone()));
}

// ============================================
// CREDIT LEDGER
// ============================================

pub fn read_credit(env: &Env, who: &Address) -> i128 {
    let key = DataKey::Credit(who.clone());
    match env.storage().persistent().get::<DataKey, i128>(&key) {
        Some(score) => {
            extend_entry(env, &key);
            score
        }
        None => 0,
    }
}

/// Adds `delta` (possibly negative) to the score; `None` on overflow.
pub fn adjust_credit(env: &Env, who: &Address, delta: i128) -> Option<i128> {
    let score = read_credit(env, who).checked_add(delta)?;
    let key = DataKey::Credit(who.clone());
    env.storage().persistent().set(&key, &score);
    extend_entry(env, &key);
    Some(score)
}

fn extend_entry(env: &Env, key: &DataKey) {
    let ttl = env.storage().max_ttl();
    env.storage().persistent().extend_ttl(key, ttl, ttl);
}
