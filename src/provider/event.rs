use std::path::Path;

use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tracing::{debug, error, info};

use crate::{
    configuration::IndexerSettings,
    dao::{Changeset, EntityStore},
    error::Error,
    event_dispatch::dispatch,
    handler::{EventContext, PriceSource},
    helpers::block_time,
    types::EventRecord,
};

/// Sequential feed driver. Each event runs its whole cascade against a
/// fresh changeset, which is committed before the next event is read.
#[derive(Debug)]
pub struct Event<'a, S, P> {
    store: &'a S,
    prices: &'a P,
    settings: &'a IndexerSettings,
    last_position: Option<(u64, u64)>,
}

impl<'a, S: EntityStore, P: PriceSource> Event<'a, S, P> {
    pub fn new(
        store: &'a S,
        prices: &'a P,
        settings: &'a IndexerSettings,
    ) -> Self {
        Self {
            store,
            prices,
            settings,
            last_position: None,
        }
    }

    /// Replays a JSON-lines file, returning how many events were applied.
    pub async fn run_file(&mut self, path: &Path) -> Result<u64, Error> {
        info!("Replaying events from {}", path.display());
        let file = File::open(path).await?;
        self.run(BufReader::new(file)).await
    }

    pub async fn run<R: AsyncBufRead + Unpin>(
        &mut self,
        reader: R,
    ) -> Result<u64, Error> {
        let mut lines = reader.lines();
        let mut line_number: u64 = 0;
        let mut applied: u64 = 0;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            let record = serde_json::from_str::<EventRecord>(&line).map_err(|e| {
                Error::ParseMessage(format!("line {}: {}", line_number, e))
            })?;

            if let Err(e) = self.process(record).await {
                error!("Event processing halted: {}", e);
                return Err(e);
            }
            applied += 1;
        }

        info!("Applied {} events", applied);
        Ok(applied)
    }

    /// Applies one event and commits its changeset. Returns the number of
    /// entities written.
    pub async fn process(&mut self, record: EventRecord) -> Result<usize, Error> {
        let position = (record.block_number, record.log_index);
        if let Some(last) = self.last_position {
            if position <= last {
                return Err(Error::OutOfOrderEvent {
                    block_number: record.block_number,
                    log_index: record.log_index,
                    last_block_number: last.0,
                    last_log_index: last.1,
                });
            }
        }

        let event_type = record.event.event_type();
        let written = self.apply(&record).await.map_err(|e| Error::EventFailed {
            block_number: record.block_number,
            log_index: record.log_index,
            event: event_type.to_string(),
            source: Box::new(e),
        })?;

        self.last_position = Some(position);
        let time = block_time(record.block_timestamp)
            .map(|time| time.to_rfc3339())
            .unwrap_or_default();
        debug!(
            "Block {} ({}) log {} {}: {} entities written",
            record.block_number, time, record.log_index, event_type, written
        );

        Ok(written)
    }

    async fn apply(&self, record: &EventRecord) -> Result<usize, Error> {
        let mut ctx = EventContext::new(
            Changeset::new(self.store),
            self.prices,
            self.settings,
            record.block_number,
            record.block_timestamp,
        );
        dispatch(&mut ctx, &record.event).await?;
        ctx.changeset.commit().await
    }
}
