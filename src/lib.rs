pub mod error;
pub mod ident;
pub mod logger;
pub mod telemetry;
pub mod config;
pub mod record;
pub mod identity;
pub mod storage;
pub mod records;
pub mod ranking;
pub mod builder;

pub use builder::RankingBuilder;
pub use config::RankingConfig;
pub use error::{RankingError, RankingResult};
pub use identity::{AuthIdentity, AuthSession, Credentials, IdentityProvider, MemoryIdentityProvider};
pub use ranking::{Direction, LiveRankingQuery, RankingSubscription, RankingView, SortField, SortSpec};
pub use record::{NewRecord, Record, RecordTime};
pub use records::RecordStore;
pub use storage::{KeyedStore, MemoryStore, StoreError};

// Test-only printing helper: expands to eprintln! during tests and debug builds.
// Usage: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In release builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        if false { let _ = format!($($arg)*); }
    });
}
