use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // REQUEST / LOAN ERRORS (20-29)
    // ============================================
    /// Borrower has no pending request
    NoRequest = 20,
    /// Borrower already has a pending request
    DuplicateRequest = 21,
    /// A loan is already active under this key (same borrower, same second)
    AlreadyActive = 22,
    /// No active loan under this key
    NotFound = 23,

    // ============================================
    // AMOUNT ERRORS (30-39)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 30,
    /// Guarantee deposit differs from the compounded value at full term
    AmountMismatch = 31,
    /// Rate above MAX_RATE
    InvalidRate = 32,
    /// Principal reduction exceeds the remaining principal
    Underflow = 33,
    /// Fixed-point or integer overflow
    Overflow = 34,

    // ============================================
    // DEADLINE ERRORS (40-49)
    // ============================================
    /// Cannot repay: deadline reached, loan must be liquidated
    LoanExpired = 40,
    /// Cannot liquidate: deadline not yet reached
    NotExpired = 41,

    // ============================================
    // TRANSFER ERRORS (50-59)
    // ============================================
    /// Token transfer rejected
    TransferFailed = 50,
}
