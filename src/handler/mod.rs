use crate::{configuration::IndexerSettings, dao::Changeset};

pub use self::token::PriceSource;

pub mod market;
pub mod position;
pub mod protocol;
pub mod token;

/// Everything one event's cascade needs: the staged writes, the quote
/// source, the domain settings and the block the event belongs to.
pub struct EventContext<'a, S, P> {
    pub changeset: Changeset<'a, S>,
    pub prices: &'a P,
    pub settings: &'a IndexerSettings,
    pub block_number: u64,
    pub timestamp: u64,
}

impl<'a, S, P> EventContext<'a, S, P> {
    pub fn new(
        changeset: Changeset<'a, S>,
        prices: &'a P,
        settings: &'a IndexerSettings,
        block_number: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            changeset,
            prices,
            settings,
            block_number,
            timestamp,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::{
        dao::{EntityStore, MemoryStore},
        error::Error,
        model::{Entity, EntityKind},
    };

    /// Quote source with a fixed answer that counts how often it is asked.
    #[derive(Debug, Default)]
    pub struct StaticPrices {
        pub price: Option<BigDecimal>,
        pub calls: AtomicUsize,
    }

    impl StaticPrices {
        pub fn new(price: Option<BigDecimal>) -> Self {
            Self {
                price,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceSource for StaticPrices {
        async fn quote(
            &self,
            _asset: &str,
            _reference_amount: &BigDecimal,
        ) -> Result<Option<BigDecimal>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.price.clone())
        }
    }

    /// Quote source whose endpoint is always down.
    #[derive(Debug, Default)]
    pub struct UnreachablePrices;

    impl PriceSource for UnreachablePrices {
        async fn quote(
            &self,
            _asset: &str,
            _reference_amount: &BigDecimal,
        ) -> Result<Option<BigDecimal>, Error> {
            Err(Error::ConfigurationError(String::from("price endpoint down")))
        }
    }

    /// Store whose reads succeed and whose commits always fail.
    #[derive(Debug, Default)]
    pub struct FailingStore {
        pub inner: MemoryStore,
    }

    impl EntityStore for FailingStore {
        async fn load(
            &self,
            kind: EntityKind,
            id: &str,
        ) -> Result<Option<Entity>, Error> {
            self.inner.load(kind, id).await
        }

        async fn commit(&self, _entities: &[Entity]) -> Result<(), Error> {
            Err(Error::store_failure("commit", "disk full"))
        }
    }

    pub fn context<'a, S: EntityStore>(
        store: &'a S,
        prices: &'a StaticPrices,
        settings: &'a IndexerSettings,
        block_number: u64,
        timestamp: u64,
    ) -> EventContext<'a, S, StaticPrices> {
        EventContext::new(
            Changeset::new(store),
            prices,
            settings,
            block_number,
            timestamp,
        )
    }
}
