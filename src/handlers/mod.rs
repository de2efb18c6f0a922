pub mod freeze_bets;
pub mod health;
pub mod simulate;
pub mod summary;
