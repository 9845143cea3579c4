#![no_std]

mod error;
mod events;
mod interest;
mod storage;

pub use error::Error;
pub use storage::{ActiveLoan, LoanKey, LoanRequest};

use events::*;
use interest::{compounded_value, principal_reduction};
use storage::MAX_RATE;

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Symbol};

#[contract]
pub struct LoanLedger;

#[contractimpl]
impl LoanLedger {
    // ============================================
    // INITIALIZATION
    // ============================================

    /// Bind the ledger to the token every loan is denominated in
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, token: Address) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        storage::write_config(&env, &token);
        log!(&env, "loan ledger initialized");

        Ok(())
    }

    // ============================================
    // FLOW 1: BORROWER REQUESTS A LOAN
    // ============================================

    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Principal <= 0
    /// - `InvalidRate`: Rate above MAX_RATE
    /// - `DuplicateRequest`: Borrower already has a pending request
    pub fn create_request(
        env: Env,
        borrower: Address,
        rate: u32,
        duration: u64,
        principal: i128,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if principal <= 0 {
            return Err(Error::InvalidAmount);
        }
        if rate > MAX_RATE {
            return Err(Error::InvalidRate);
        }

        borrower.require_auth();

        if storage::has_request(&env, &borrower) {
            return Err(Error::DuplicateRequest);
        }

        storage::write_request(
            &env,
            &borrower,
            &LoanRequest {
                rate,
                duration,
                principal,
            },
        );

        env.events().publish(
            (Symbol::new(&env, "loan_requested"), borrower.clone()),
            LoanRequestedEvent {
                borrower,
                rate,
                duration,
                principal,
            },
        );

        Ok(())
    }

    /// # Errors
    /// - `NoRequest`: Borrower has no pending request
    pub fn delete_request(env: Env, borrower: Address) -> Result<(), Error> {
        borrower.require_auth();

        if !storage::has_request(&env, &borrower) {
            return Err(Error::NoRequest);
        }
        storage::remove_request(&env, &borrower);

        env.events().publish(
            (Symbol::new(&env, "request_deleted"), borrower.clone()),
            RequestDeletedEvent { borrower },
        );

        Ok(())
    }

    // ============================================
    // FLOW 2: GUARANTOR ACTIVATES THE LOAN
    // ============================================

    /// Lock the full compounded value and disburse the principal
    ///
    /// The guarantor deposits `compounded_value(rate, duration, principal)`;
    /// only `principal` leaves for the borrower, the rest stays as collateral
    /// for the interest.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Deposit <= 0
    /// - `NoRequest`: Borrower has no pending request
    /// - `AlreadyActive`: Borrower already activated a loan this second
    /// - `AmountMismatch`: Deposit differs from the required final value
    /// - `TransferFailed`: Deposit or disbursement rejected by the token
    pub fn guarantee(
        env: Env,
        guarantor: Address,
        borrower: Address,
        deposit: i128,
    ) -> Result<LoanKey, Error> {
        Self::check_initialized(&env)?;

        if deposit <= 0 {
            return Err(Error::InvalidAmount);
        }

        guarantor.require_auth();

        let request = storage::read_request(&env, &borrower).ok_or(Error::NoRequest)?;

        let now = env.ledger().timestamp();
        let key = LoanKey {
            borrower: borrower.clone(),
            activated_at: now,
        };
        if storage::read_loan(&env, &key).is_some() {
            return Err(Error::AlreadyActive);
        }

        let required = compounded_value(request.rate, request.duration, request.principal)
            .ok_or(Error::Overflow)?;
        if deposit != required {
            log!(&env, "guarantee requires {}, got {}", required, deposit);
            return Err(Error::AmountMismatch);
        }

        let deadline = now.checked_add(request.duration).ok_or(Error::Overflow)?;

        storage::remove_request(&env, &borrower);
        storage::write_loan(
            &env,
            &key,
            &ActiveLoan {
                rate: request.rate,
                principal: request.principal,
                activated_at: now,
                deadline,
                guarantor: guarantor.clone(),
            },
        );

        let ledger = env.current_contract_address();
        Self::transfer(&env, &guarantor, &ledger, deposit)?;
        Self::transfer(&env, &ledger, &borrower, request.principal)?;

        env.events().publish(
            (Symbol::new(&env, "loan_borrowed"), borrower.clone()),
            LoanBorrowedEvent {
                borrower,
                guarantor,
                activated_at: now,
                principal: request.principal,
                deposit,
                deadline,
            },
        );

        Ok(key)
    }

    // ============================================
    // FLOW 3: REPAY
    // ============================================

    /// Pay toward a live loan
    ///
    /// Paying at least the current interest value settles the loan; anything
    /// above it is kept by the ledger. A smaller payment retires principal in
    /// proportion to how far the loan has compounded.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `NotFound`: No loan under this key
    /// - `LoanExpired`: Deadline reached, use `liquidate`
    /// - `Underflow`: Reduction exceeds remaining principal
    /// - `TransferFailed`: Payment or guarantor payout rejected by the token
    pub fn repay(env: Env, key: LoanKey, payer: Address, amount: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        payer.require_auth();

        let mut loan = storage::read_loan(&env, &key).ok_or(Error::NotFound)?;
        let now = env.ledger().timestamp();
        if now >= loan.deadline {
            return Err(Error::LoanExpired);
        }

        let interest_value =
            interest::current_interest_value(&loan, now).ok_or(Error::Overflow)?;

        let guarantor_payout = if amount >= interest_value {
            // payout = final_value + interest_value - principal
            let final_value =
                interest::current_interest_value(&loan, now).ok_or(Error::Overflow)?;
            let payout = final_value
                .checked_add(interest_value)
                .and_then(|v| v.checked_sub(loan.principal))
                .ok_or(Error::Overflow)?;

            loan.principal = 0;
            storage::remove_loan(&env, &key);
            payout
        } else {
            let delta = principal_reduction(amount, interest_value, loan.principal)
                .ok_or(Error::Overflow)?;
            if delta > loan.principal {
                return Err(Error::Underflow);
            }
            let remaining = loan.principal - delta;
            let payout = amount
                .checked_mul(2)
                .and_then(|v| v.checked_sub(delta))
                .ok_or(Error::Overflow)?;

            loan.principal = remaining;
            if remaining == 0 {
                storage::remove_loan(&env, &key);
            } else {
                storage::write_loan(&env, &key, &loan);
            }
            payout
        };

        storage::adjust_credit(&env, &payer, amount).ok_or(Error::Overflow)?;

        let ledger = env.current_contract_address();
        Self::transfer(&env, &payer, &ledger, amount)?;
        Self::transfer(&env, &ledger, &loan.guarantor, guarantor_payout)?;

        env.events().publish(
            (Symbol::new(&env, "loan_repaid"), key.borrower.clone()),
            LoanRepaidEvent {
                borrower: key.borrower.clone(),
                activated_at: key.activated_at,
                payer,
                amount,
                remaining_principal: loan.principal,
            },
        );
        log!(
            &env,
            "repaid {}, guarantor paid {}, {} principal left",
            amount,
            guarantor_payout,
            loan.principal
        );

        Ok(())
    }

    // ============================================
    // FLOW 4: LIQUIDATE
    // ============================================

    /// Close an expired loan and pay its accrued interest to the liquidator
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotFound`: No loan under this key
    /// - `NotExpired`: Deadline not yet reached
    /// - `TransferFailed`: Reward rejected by the token
    pub fn liquidate(env: Env, key: LoanKey, liquidator: Address) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        let loan = storage::read_loan(&env, &key).ok_or(Error::NotFound)?;
        let now = env.ledger().timestamp();
        if now < loan.deadline {
            return Err(Error::NotExpired);
        }

        liquidator.require_auth();

        let final_value =
            interest::current_interest_value(&loan, now).ok_or(Error::Overflow)?;
        let reward = final_value.checked_sub(loan.principal).ok_or(Error::Overflow)?;

        storage::adjust_credit(&env, &key.borrower, -loan.principal).ok_or(Error::Overflow)?;
        storage::remove_loan(&env, &key);

        let ledger = env.current_contract_address();
        Self::transfer(&env, &ledger, &liquidator, reward)?;

        env.events().publish(
            (Symbol::new(&env, "loan_liquidated"), key.borrower.clone()),
            LoanLiquidatedEvent {
                borrower: key.borrower.clone(),
                activated_at: key.activated_at,
                liquidator,
                principal_forfeited: loan.principal,
                reward,
            },
        );
        log!(&env, "liquidated {} principal, reward {}", loan.principal, reward);

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_token(env: Env) -> Result<Address, Error> {
        storage::read_token(&env).ok_or(Error::NotInitialized)
    }

    pub fn get_request(env: Env, borrower: Address) -> Result<LoanRequest, Error> {
        storage::read_request(&env, &borrower).ok_or(Error::NoRequest)
    }

    /// Exact deposit `guarantee` will accept for the borrower's pending request
    pub fn required_deposit(env: Env, borrower: Address) -> Result<i128, Error> {
        let request = storage::read_request(&env, &borrower).ok_or(Error::NoRequest)?;
        compounded_value(request.rate, request.duration, request.principal).ok_or(Error::Overflow)
    }

    pub fn get_loan(env: Env, key: LoanKey) -> Result<ActiveLoan, Error> {
        storage::read_loan(&env, &key).ok_or(Error::NotFound)
    }

    pub fn current_interest_value(env: Env, key: LoanKey) -> Result<i128, Error> {
        let loan = storage::read_loan(&env, &key).ok_or(Error::NotFound)?;
        interest::current_interest_value(&loan, env.ledger().timestamp()).ok_or(Error::Overflow)
    }

    pub fn is_loan_expired(env: Env, key: LoanKey) -> Result<bool, Error> {
        let loan = storage::read_loan(&env, &key).ok_or(Error::NotFound)?;
        Ok(env.ledger().timestamp() >= loan.deadline)
    }

    pub fn credit_score(env: Env, who: Address) -> i128 {
        storage::read_credit(&env, &who)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_initialized(env: &Env) -> Result<(), Error> {
        if !storage::is_initialized(env) {
            return Err(Error::NotInitialized);
        }
        storage::extend_instance(env);
        Ok(())
    }

    fn transfer(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }

        let token = storage::read_token(env).ok_or(Error::NotInitialized)?;
        match token::Client::new(env, &token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(env, "transfer of {} rejected", amount);
                Err(Error::TransferFailed)
            }
        }
    }
}
