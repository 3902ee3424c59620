//! Asset ledger and record store
//!
//! The escrow processor never touches global state: it receives a value
//! implementing `AssetLedger` (token balances, transfers, account slots)
//! and `RecordStore` (program-owned state accounts). `LedgerState` is the
//! in-memory implementation used by the `Bank`; it is `Clone` so a
//! transaction can execute against a private copy and be discarded whole.

use escrow_types::account::{
    Account, AccountData, Mint, TokenAccount, MINT_LEN, SYSTEM_PROGRAM_ID, TOKEN_ACCOUNT_LEN,
    TOKEN_PROGRAM_ID,
};
use escrow_types::errors::LedgerError;
use escrow_types::ids::Pubkey;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::RentConfig;
use crate::pda::associated_token_address;
use crate::security::SignerSet;

/// Fungible token balances keyed by (mint, owner).
pub trait AssetLedger {
    /// Raw account lookup
    fn account(&self, address: &Pubkey) -> Option<&Account>;

    /// Native balance of an account (0 if absent)
    fn lamports(&self, address: &Pubkey) -> u64 {
        self.account(address).map_or(0, |acc| acc.lamports)
    }

    fn mint(&self, mint: &Pubkey) -> Result<Mint, LedgerError>;

    fn token_account(&self, address: &Pubkey) -> Result<TokenAccount, LedgerError>;

    /// Balance of `owner`'s associated token account for `mint` (0 if absent)
    fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64;

    /// Create `owner`'s associated token account for `mint`, paid by `payer`.
    /// Fails if it already exists.
    fn create_associated_token_account(
        &mut self,
        payer: &Pubkey,
        owner: &Pubkey,
        mint: &Pubkey,
        signers: &SignerSet,
    ) -> Result<Pubkey, LedgerError>;

    /// Like `create_associated_token_account` but succeeds without effect
    /// when the account already exists.
    fn create_associated_token_account_idempotent(
        &mut self,
        payer: &Pubkey,
        owner: &Pubkey,
        mint: &Pubkey,
        signers: &SignerSet,
    ) -> Result<Pubkey, LedgerError>;

    /// Move `amount` of `mint` between token accounts. `authority` must own
    /// `source` and be in `signers`; `decimals` must match the mint.
    #[allow(clippy::too_many_arguments)]
    fn transfer_checked(
        &mut self,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
        amount: u64,
        decimals: u8,
        signers: &SignerSet,
    ) -> Result<(), LedgerError>;

    /// Close an empty token account, sweeping its lamports to `destination`.
    /// Returns the lamports swept.
    fn close_token_account(
        &mut self,
        account: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
        signers: &SignerSet,
    ) -> Result<u64, LedgerError>;
}

/// Program-owned state accounts, addressed by derivation.
pub trait RecordStore {
    /// Create a program-owned account at `address`. Both `payer` and
    /// `address` must be in `signers`.
    fn create_program_account(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        program_id: &Pubkey,
        data: Vec<u8>,
        signers: &SignerSet,
    ) -> Result<(), LedgerError>;

    fn program_account_data(&self, address: &Pubkey, program_id: &Pubkey)
        -> Result<&[u8], LedgerError>;

    /// Delete a program-owned account, sweeping its lamports to `destination`.
    fn close_program_account(
        &mut self,
        address: &Pubkey,
        program_id: &Pubkey,
        destination: &Pubkey,
    ) -> Result<u64, LedgerError>;
}

/// Everything the escrow processor needs from its environment.
pub trait Ledger: AssetLedger + RecordStore {}

impl<T: AssetLedger + RecordStore> Ledger for T {}

/// In-memory ledger.
///
/// Accounts are kept in a `BTreeMap` so iteration (and therefore any
/// snapshot or debug output) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    accounts: BTreeMap<Pubkey, Account>,
    rent: RentConfig,
}

impl LedgerState {
    pub fn new(rent: RentConfig) -> Self {
        Self {
            accounts: BTreeMap::new(),
            rent,
        }
    }

    pub fn rent(&self) -> &RentConfig {
        &self.rent
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.accounts.contains_key(address)
    }

    // ───────────────────────── Issuance (external collaborator) ─────────────────────────

    /// Credit lamports out of thin air, creating a wallet if needed.
    pub fn airdrop(&mut self, to: &Pubkey, lamports: u64) -> Result<(), LedgerError> {
        self.credit_lamports(to, lamports)
    }

    /// Register a new mint with `authority` as issuer.
    pub fn create_mint(
        &mut self,
        mint: Pubkey,
        authority: Pubkey,
        decimals: u8,
    ) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&mint) {
            return Err(LedgerError::AccountAlreadyExists { address: mint });
        }
        self.accounts.insert(
            mint,
            Account {
                lamports: self.rent.minimum_balance(MINT_LEN),
                owner: TOKEN_PROGRAM_ID,
                data: AccountData::Mint(Mint {
                    mint_authority: Some(authority),
                    supply: 0,
                    decimals,
                }),
            },
        );
        debug!(%mint, %authority, decimals, "Mint created");
        Ok(())
    }

    /// Issue `amount` of `mint` into `owner`'s associated token account,
    /// creating it if absent (storage funded by the issuer).
    pub fn mint_to(
        &mut self,
        mint: &Pubkey,
        owner: &Pubkey,
        amount: u64,
        authority: &Pubkey,
        signers: &SignerSet,
    ) -> Result<Pubkey, LedgerError> {
        if !signers.contains(authority) {
            return Err(LedgerError::MissingSignature {
                authority: *authority,
            });
        }
        let info = self.mint(mint)?;
        if info.mint_authority != Some(*authority) {
            return Err(LedgerError::OwnerMismatch {
                address: *mint,
                expected: info.mint_authority.unwrap_or_default(),
                found: *authority,
            });
        }
        let new_supply = info.supply.checked_add(amount).ok_or(LedgerError::Overflow)?;

        let address = associated_token_address(owner, mint)
            .map_err(|_| LedgerError::DerivationFailed { owner: *owner })?;
        let new_balance = match self.token_account(&address) {
            Ok(token) => token.amount.checked_add(amount).ok_or(LedgerError::Overflow)?,
            Err(LedgerError::AccountNotFound { .. }) => {
                self.accounts.insert(
                    address,
                    Account {
                        lamports: self.rent.minimum_balance(TOKEN_ACCOUNT_LEN),
                        owner: TOKEN_PROGRAM_ID,
                        data: AccountData::Token(TokenAccount {
                            mint: *mint,
                            owner: *owner,
                            amount: 0,
                        }),
                    },
                );
                amount
            }
            Err(e) => return Err(e),
        };

        self.mint_mut(mint)?.supply = new_supply;
        self.token_mut(&address)?.amount = new_balance;
        debug!(%mint, %owner, amount, "Tokens issued");
        Ok(address)
    }

    // ───────────────────────── Internal helpers ─────────────────────────

    fn mint_mut(&mut self, address: &Pubkey) -> Result<&mut Mint, LedgerError> {
        let account = self
            .accounts
            .get_mut(address)
            .ok_or(LedgerError::AccountNotFound { address: *address })?;
        match &mut account.data {
            AccountData::Mint(mint) if account.owner == TOKEN_PROGRAM_ID => Ok(mint),
            _ => Err(LedgerError::InvalidAccountData { address: *address }),
        }
    }

    fn token_mut(&mut self, address: &Pubkey) -> Result<&mut TokenAccount, LedgerError> {
        self.accounts
            .get_mut(address)
            .ok_or(LedgerError::AccountNotFound { address: *address })?
            .as_token_mut()
            .ok_or(LedgerError::InvalidAccountData { address: *address })
    }

    fn credit_lamports(&mut self, address: &Pubkey, lamports: u64) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| Account::wallet(0));
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn debit_lamports(&mut self, address: &Pubkey, lamports: u64) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(address)
            .ok_or(LedgerError::AccountNotFound { address: *address })?;
        if account.lamports < lamports {
            return Err(LedgerError::InsufficientLamports {
                address: *address,
                required: lamports,
                available: account.lamports,
            });
        }
        account.lamports -= lamports;
        Ok(())
    }

    /// Allocate `data` at `address`, owned by `owner`, charging `payer` rent.
    ///
    /// An address that only holds pre-funded lamports (a bare wallet) may be
    /// taken over; the payer covers whatever rent is still missing.
    fn create_account(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        owner: Pubkey,
        data: AccountData,
        signers: &SignerSet,
    ) -> Result<(), LedgerError> {
        if !signers.contains(payer) {
            return Err(LedgerError::MissingSignature { authority: *payer });
        }
        let existing = match self.accounts.get(address) {
            None => 0,
            Some(acc) if acc.owner == SYSTEM_PROGRAM_ID && acc.data.is_empty() => acc.lamports,
            Some(_) => return Err(LedgerError::AccountAlreadyExists { address: *address }),
        };

        let rent = self.rent.minimum_balance(data.len());
        let top_up = rent.saturating_sub(existing);
        self.debit_lamports(payer, top_up)?;
        self.accounts.insert(
            *address,
            Account {
                lamports: existing.max(rent),
                owner,
                data,
            },
        );
        Ok(())
    }

    /// Remove `address` and sweep its lamports to `destination`.
    fn remove_and_sweep(&mut self, address: &Pubkey, destination: &Pubkey) -> Result<u64, LedgerError> {
        let lamports = self.lamports(address);
        let dest_balance = self.lamports(destination);
        dest_balance.checked_add(lamports).ok_or(LedgerError::Overflow)?;

        self.accounts.remove(address);
        self.credit_lamports(destination, lamports)?;
        Ok(lamports)
    }
}

impl AssetLedger for LedgerState {
    fn account(&self, address: &Pubkey) -> Option<&Account> {
        self.accounts.get(address)
    }

    fn mint(&self, mint: &Pubkey) -> Result<Mint, LedgerError> {
        self.accounts
            .get(mint)
            .ok_or(LedgerError::AccountNotFound { address: *mint })?
            .as_mint()
            .cloned()
            .ok_or(LedgerError::InvalidAccountData { address: *mint })
    }

    fn token_account(&self, address: &Pubkey) -> Result<TokenAccount, LedgerError> {
        self.accounts
            .get(address)
            .ok_or(LedgerError::AccountNotFound { address: *address })?
            .as_token()
            .cloned()
            .ok_or(LedgerError::InvalidAccountData { address: *address })
    }

    fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        associated_token_address(owner, mint)
            .ok()
            .and_then(|address| self.token_account(&address).ok())
            .map_or(0, |token| token.amount)
    }

    fn create_associated_token_account(
        &mut self,
        payer: &Pubkey,
        owner: &Pubkey,
        mint: &Pubkey,
        signers: &SignerSet,
    ) -> Result<Pubkey, LedgerError> {
        self.mint(mint)?;
        let address = associated_token_address(owner, mint)
            .map_err(|_| LedgerError::DerivationFailed { owner: *owner })?;
        let data = AccountData::Token(TokenAccount {
            mint: *mint,
            owner: *owner,
            amount: 0,
        });
        self.create_account(payer, &address, TOKEN_PROGRAM_ID, data, signers)?;
        debug!(%address, %owner, %mint, %payer, "Associated token account created");
        Ok(address)
    }

    fn create_associated_token_account_idempotent(
        &mut self,
        payer: &Pubkey,
        owner: &Pubkey,
        mint: &Pubkey,
        signers: &SignerSet,
    ) -> Result<Pubkey, LedgerError> {
        let address = associated_token_address(owner, mint)
            .map_err(|_| LedgerError::DerivationFailed { owner: *owner })?;
        match self.token_account(&address) {
            Ok(token) => {
                if token.mint != *mint {
                    return Err(LedgerError::MintMismatch {
                        expected: *mint,
                        found: token.mint,
                    });
                }
                if token.owner != *owner {
                    return Err(LedgerError::OwnerMismatch {
                        address,
                        expected: *owner,
                        found: token.owner,
                    });
                }
                Ok(address)
            }
            Err(_) => self.create_associated_token_account(payer, owner, mint, signers),
        }
    }

    fn transfer_checked(
        &mut self,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
        amount: u64,
        decimals: u8,
        signers: &SignerSet,
    ) -> Result<(), LedgerError> {
        if !signers.contains(authority) {
            return Err(LedgerError::MissingSignature {
                authority: *authority,
            });
        }

        let mint_info = self.mint(mint)?;
        if mint_info.decimals != decimals {
            return Err(LedgerError::DecimalsMismatch {
                expected: mint_info.decimals,
                found: decimals,
            });
        }

        let src = self.token_account(source)?;
        if src.mint != *mint {
            return Err(LedgerError::MintMismatch {
                expected: *mint,
                found: src.mint,
            });
        }
        if src.owner != *authority {
            return Err(LedgerError::OwnerMismatch {
                address: *source,
                expected: src.owner,
                found: *authority,
            });
        }

        let dst = self.token_account(destination)?;
        if dst.mint != *mint {
            return Err(LedgerError::MintMismatch {
                expected: *mint,
                found: dst.mint,
            });
        }

        if src.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                address: *source,
                required: amount,
                available: src.amount,
            });
        }
        if source == destination {
            return Ok(());
        }
        let new_dst = dst.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;

        self.token_mut(source)?.amount = src.amount - amount;
        self.token_mut(destination)?.amount = new_dst;
        debug!(%source, %destination, %mint, amount, "Tokens transferred");
        Ok(())
    }

    fn close_token_account(
        &mut self,
        account: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
        signers: &SignerSet,
    ) -> Result<u64, LedgerError> {
        if !signers.contains(authority) {
            return Err(LedgerError::MissingSignature {
                authority: *authority,
            });
        }
        let token = self.token_account(account)?;
        if token.owner != *authority {
            return Err(LedgerError::OwnerMismatch {
                address: *account,
                expected: token.owner,
                found: *authority,
            });
        }
        if token.amount != 0 {
            return Err(LedgerError::NonZeroBalance {
                address: *account,
                amount: token.amount,
            });
        }
        let swept = self.remove_and_sweep(account, destination)?;
        debug!(%account, %destination, swept, "Token account closed");
        Ok(swept)
    }
}

impl RecordStore for LedgerState {
    fn create_program_account(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        program_id: &Pubkey,
        data: Vec<u8>,
        signers: &SignerSet,
    ) -> Result<(), LedgerError> {
        if !signers.contains(address) {
            return Err(LedgerError::MissingSignature {
                authority: *address,
            });
        }
        self.create_account(payer, address, *program_id, AccountData::Program(data), signers)
    }

    fn program_account_data(
        &self,
        address: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<&[u8], LedgerError> {
        let account = self
            .accounts
            .get(address)
            .ok_or(LedgerError::AccountNotFound { address: *address })?;
        if account.owner != *program_id {
            return Err(LedgerError::OwnerMismatch {
                address: *address,
                expected: *program_id,
                found: account.owner,
            });
        }
        match &account.data {
            AccountData::Program(bytes) => Ok(bytes),
            _ => Err(LedgerError::InvalidAccountData { address: *address }),
        }
    }

    fn close_program_account(
        &mut self,
        address: &Pubkey,
        program_id: &Pubkey,
        destination: &Pubkey,
    ) -> Result<u64, LedgerError> {
        self.program_account_data(address, program_id)?;
        let swept = self.remove_and_sweep(address, destination)?;
        debug!(%address, %destination, swept, "Program account closed");
        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        ledger: LedgerState,
        authority: Pubkey,
        mint: Pubkey,
        alice: Pubkey,
        bob: Pubkey,
    }

    fn setup() -> Fixture {
        let mut ledger = LedgerState::default();
        let authority = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        ledger.create_mint(mint, authority, 6).unwrap();
        ledger.airdrop(&alice, 10_000_000).unwrap();
        ledger.airdrop(&bob, 10_000_000).unwrap();
        Fixture {
            ledger,
            authority,
            mint,
            alice,
            bob,
        }
    }

    fn signed(keys: &[Pubkey]) -> SignerSet {
        keys.iter().copied().collect()
    }

    // ─── Issuance tests ───

    #[test]
    fn test_mint_to_creates_slot_and_tracks_supply() {
        let mut f = setup();
        f.ledger
            .mint_to(&f.mint, &f.alice, 500, &f.authority, &signed(&[f.authority]))
            .unwrap();
        f.ledger
            .mint_to(&f.mint, &f.alice, 250, &f.authority, &signed(&[f.authority]))
            .unwrap();
        assert_eq!(f.ledger.balance_of(&f.mint, &f.alice), 750);
        assert_eq!(f.ledger.mint(&f.mint).unwrap().supply, 750);
    }

    #[test]
    fn test_mint_to_wrong_authority() {
        let mut f = setup();
        let eve = Pubkey::new_unique();
        let result = f.ledger.mint_to(&f.mint, &f.alice, 1, &eve, &signed(&[eve]));
        assert!(matches!(result, Err(LedgerError::OwnerMismatch { .. })));
    }

    #[test]
    fn test_create_mint_twice_rejected() {
        let mut f = setup();
        let result = f.ledger.create_mint(f.mint, f.authority, 6);
        assert_eq!(result, Err(LedgerError::AccountAlreadyExists { address: f.mint }));
    }

    // ─── Associated token account tests ───

    #[test]
    fn test_create_ata_charges_payer_rent() {
        let mut f = setup();
        let before = f.ledger.lamports(&f.alice);
        let ata = f
            .ledger
            .create_associated_token_account(&f.alice, &f.bob, &f.mint, &signed(&[f.alice]))
            .unwrap();
        let rent = f.ledger.rent().minimum_balance(TOKEN_ACCOUNT_LEN);
        assert_eq!(f.ledger.lamports(&f.alice), before - rent);
        assert_eq!(f.ledger.lamports(&ata), rent);
        assert_eq!(f.ledger.token_account(&ata).unwrap().owner, f.bob);
    }

    #[test]
    fn test_create_ata_twice_rejected() {
        let mut f = setup();
        let signers = signed(&[f.alice]);
        let ata = f
            .ledger
            .create_associated_token_account(&f.alice, &f.alice, &f.mint, &signers)
            .unwrap();
        let result = f
            .ledger
            .create_associated_token_account(&f.alice, &f.alice, &f.mint, &signers);
        assert_eq!(result, Err(LedgerError::AccountAlreadyExists { address: ata }));
    }

    #[test]
    fn test_create_ata_idempotent() {
        let mut f = setup();
        let signers = signed(&[f.alice]);
        let first = f
            .ledger
            .create_associated_token_account_idempotent(&f.alice, &f.alice, &f.mint, &signers)
            .unwrap();
        let lamports = f.ledger.lamports(&f.alice);
        let second = f
            .ledger
            .create_associated_token_account_idempotent(&f.alice, &f.alice, &f.mint, &signers)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(f.ledger.lamports(&f.alice), lamports, "second call is free");
    }

    #[test]
    fn test_create_ata_requires_payer_signature() {
        let mut f = setup();
        let result = f
            .ledger
            .create_associated_token_account(&f.alice, &f.alice, &f.mint, &SignerSet::new());
        assert_eq!(result, Err(LedgerError::MissingSignature { authority: f.alice }));
    }

    #[test]
    fn test_create_ata_payer_without_lamports() {
        let mut f = setup();
        let poor = Pubkey::new_unique();
        f.ledger.airdrop(&poor, 1).unwrap();
        let result = f
            .ledger
            .create_associated_token_account(&poor, &poor, &f.mint, &signed(&[poor]));
        assert!(matches!(result, Err(LedgerError::InsufficientLamports { .. })));
    }

    #[test]
    fn test_prefunded_address_can_be_allocated() {
        let mut f = setup();
        let ata = associated_token_address(&f.bob, &f.mint).unwrap();
        f.ledger.airdrop(&ata, 1_000).unwrap();

        let before = f.ledger.lamports(&f.alice);
        f.ledger
            .create_associated_token_account(&f.alice, &f.bob, &f.mint, &signed(&[f.alice]))
            .unwrap();
        let rent = f.ledger.rent().minimum_balance(TOKEN_ACCOUNT_LEN);
        assert_eq!(f.ledger.lamports(&f.alice), before - (rent - 1_000));
        assert_eq!(f.ledger.lamports(&ata), rent);
    }

    // ─── Transfer tests ───

    #[test]
    fn test_transfer_checked_moves_tokens() {
        let mut f = setup();
        let src = f
            .ledger
            .mint_to(&f.mint, &f.alice, 100, &f.authority, &signed(&[f.authority]))
            .unwrap();
        let dst = f
            .ledger
            .create_associated_token_account(&f.bob, &f.bob, &f.mint, &signed(&[f.bob]))
            .unwrap();

        f.ledger
            .transfer_checked(&src, &f.mint, &dst, &f.alice, 40, 6, &signed(&[f.alice]))
            .unwrap();
        assert_eq!(f.ledger.balance_of(&f.mint, &f.alice), 60);
        assert_eq!(f.ledger.balance_of(&f.mint, &f.bob), 40);
    }

    #[test]
    fn test_transfer_checked_insufficient() {
        let mut f = setup();
        let src = f
            .ledger
            .mint_to(&f.mint, &f.alice, 10, &f.authority, &signed(&[f.authority]))
            .unwrap();
        let dst = f
            .ledger
            .create_associated_token_account(&f.bob, &f.bob, &f.mint, &signed(&[f.bob]))
            .unwrap();
        let result =
            f.ledger
                .transfer_checked(&src, &f.mint, &dst, &f.alice, 11, 6, &signed(&[f.alice]));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                address: src,
                required: 11,
                available: 10
            })
        );
        assert_eq!(f.ledger.balance_of(&f.mint, &f.alice), 10);
    }

    #[test]
    fn test_transfer_checked_wrong_decimals() {
        let mut f = setup();
        let src = f
            .ledger
            .mint_to(&f.mint, &f.alice, 10, &f.authority, &signed(&[f.authority]))
            .unwrap();
        let result =
            f.ledger
                .transfer_checked(&src, &f.mint, &src, &f.alice, 1, 9, &signed(&[f.alice]));
        assert_eq!(
            result,
            Err(LedgerError::DecimalsMismatch {
                expected: 6,
                found: 9
            })
        );
    }

    #[test]
    fn test_transfer_checked_requires_owner() {
        let mut f = setup();
        let src = f
            .ledger
            .mint_to(&f.mint, &f.alice, 10, &f.authority, &signed(&[f.authority]))
            .unwrap();
        let dst = f
            .ledger
            .create_associated_token_account(&f.bob, &f.bob, &f.mint, &signed(&[f.bob]))
            .unwrap();
        let result =
            f.ledger
                .transfer_checked(&src, &f.mint, &dst, &f.bob, 1, 6, &signed(&[f.bob]));
        assert!(matches!(result, Err(LedgerError::OwnerMismatch { .. })));

        let result = f
            .ledger
            .transfer_checked(&src, &f.mint, &dst, &f.alice, 1, 6, &SignerSet::new());
        assert_eq!(result, Err(LedgerError::MissingSignature { authority: f.alice }));
    }

    #[test]
    fn test_transfer_checked_rejects_other_mint() {
        let mut f = setup();
        let other_mint = Pubkey::new_unique();
        f.ledger.create_mint(other_mint, f.authority, 6).unwrap();
        let src = f
            .ledger
            .mint_to(&f.mint, &f.alice, 10, &f.authority, &signed(&[f.authority]))
            .unwrap();
        let dst = f
            .ledger
            .create_associated_token_account(&f.bob, &f.bob, &other_mint, &signed(&[f.bob]))
            .unwrap();
        let result =
            f.ledger
                .transfer_checked(&src, &f.mint, &dst, &f.alice, 1, 6, &signed(&[f.alice]));
        assert!(matches!(result, Err(LedgerError::MintMismatch { .. })));
    }

    // ─── Close tests ───

    #[test]
    fn test_close_token_account_sweeps_lamports() {
        let mut f = setup();
        let ata = f
            .ledger
            .create_associated_token_account(&f.alice, &f.alice, &f.mint, &signed(&[f.alice]))
            .unwrap();
        let rent = f.ledger.lamports(&ata);
        let before = f.ledger.lamports(&f.bob);

        let swept = f
            .ledger
            .close_token_account(&ata, &f.bob, &f.alice, &signed(&[f.alice]))
            .unwrap();
        assert_eq!(swept, rent);
        assert_eq!(f.ledger.lamports(&f.bob), before + rent);
        assert!(!f.ledger.contains(&ata));
    }

    #[test]
    fn test_close_token_account_non_zero_rejected() {
        let mut f = setup();
        let ata = f
            .ledger
            .mint_to(&f.mint, &f.alice, 1, &f.authority, &signed(&[f.authority]))
            .unwrap();
        let result = f
            .ledger
            .close_token_account(&ata, &f.alice, &f.alice, &signed(&[f.alice]));
        assert_eq!(result, Err(LedgerError::NonZeroBalance { address: ata, amount: 1 }));
    }

    // ─── Record store tests ───

    #[test]
    fn test_program_account_lifecycle() {
        let mut f = setup();
        let program_id = Pubkey::new_unique();
        let record = Pubkey::new_unique();
        let signers = signed(&[f.alice, record]);

        f.ledger
            .create_program_account(&f.alice, &record, &program_id, vec![1, 2, 3], &signers)
            .unwrap();
        assert_eq!(
            f.ledger.program_account_data(&record, &program_id).unwrap(),
            &[1, 2, 3]
        );

        let rent = f.ledger.rent().minimum_balance(3);
        let swept = f
            .ledger
            .close_program_account(&record, &program_id, &f.bob)
            .unwrap();
        assert_eq!(swept, rent);
        assert_eq!(
            f.ledger.program_account_data(&record, &program_id),
            Err(LedgerError::AccountNotFound { address: record })
        );
    }

    #[test]
    fn test_program_account_requires_address_signature() {
        let mut f = setup();
        let record = Pubkey::new_unique();
        let result = f.ledger.create_program_account(
            &f.alice,
            &record,
            &Pubkey::new_unique(),
            vec![0],
            &signed(&[f.alice]),
        );
        assert_eq!(result, Err(LedgerError::MissingSignature { authority: record }));
    }

    #[test]
    fn test_program_account_wrong_owner() {
        let mut f = setup();
        let program_id = Pubkey::new_unique();
        let record = Pubkey::new_unique();
        f.ledger
            .create_program_account(&f.alice, &record, &program_id, vec![0], &signed(&[f.alice, record]))
            .unwrap();
        let result = f.ledger.program_account_data(&record, &Pubkey::new_unique());
        assert!(matches!(result, Err(LedgerError::OwnerMismatch { .. })));
    }
}
