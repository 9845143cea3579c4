use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanRequestedEvent {
    pub borrower: Address,
    pub rate: u32,
    pub duration: u64,
    pub principal: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestDeletedEvent {
    pub borrower: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanBorrowedEvent {
    pub borrower: Address,
    pub guarantor: Address,
    pub activated_at: u64,
    pub principal: i128,
    pub deposit: i128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanRepaidEvent {
    pub borrower: Address,
    pub activated_at: u64,
    pub payer: Address,
    pub amount: i128,
    pub remaining_principal: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanLiquidatedEvent {
    pub borrower: Address,
    pub activated_at: u64,
    pub liquidator: Address,
    pub principal_forfeited: i128,
    pub reward: i128,
}
