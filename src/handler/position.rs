use bigdecimal::{BigDecimal, Zero};
use tracing::{info, warn};

use crate::{
    dao::EntityStore,
    error::Error,
    handler::{market, protocol, EventContext},
    model::{Account, EntityKind, Position},
};

/// Counter changes caused by one position update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct UsageChange {
    created: bool,
    opened: bool,
    closed: bool,
    new_owner: bool,
}

impl UsageChange {
    fn is_empty(&self) -> bool {
        *self == UsageChange::default()
    }
}

/// The owner is attached only when the position is created, owner tracking
/// is enabled and one is supplied. An existing owner is never cleared.
pub async fn get_or_create<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    id: &str,
    owner: Option<&str>,
) -> Result<Position, Error> {
    load_or_create(ctx, id, owner)
        .await
        .map(|(position, _)| position)
}

async fn load_or_create<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    id: &str,
    owner: Option<&str>,
) -> Result<(Position, bool), Error> {
    if let Some(position) =
        ctx.changeset.load::<Position>(EntityKind::Position, id).await?
    {
        return Ok((position, false));
    }

    let owner = owner.filter(|_| ctx.settings.track_position_owner);
    let position = Position::new(id, owner);
    ctx.changeset.save(position.clone());

    Ok((position, true))
}

/// Overwrites both balances. Negative values are kept as received.
pub async fn apply_update<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    id: &str,
    owner: Option<&str>,
    collateral: BigDecimal,
    debt: BigDecimal,
) -> Result<Position, Error> {
    let (mut position, created) = load_or_create(ctx, id, owner).await?;
    let was_open = position.is_open();

    let zero = BigDecimal::zero();
    if collateral < zero || debt < zero {
        warn!(
            "Position {} received negative balance: collateral {}, debt {}",
            id, collateral, debt
        );
    }

    position.collateral = collateral;
    position.debt = debt;
    ctx.changeset.save(position.clone());

    if ctx.settings.metric_profile.tracks_usage() {
        let is_open = position.is_open();
        let mut change = UsageChange {
            created,
            opened: !was_open && is_open,
            closed: was_open && !is_open,
            new_owner: false,
        };
        if created {
            if let Some(owner) = position.owner.as_deref() {
                change.new_owner = track_account(ctx, owner).await?;
            }
        }
        update_usage(ctx, change).await?;
    }

    Ok(position)
}

/// Counts the new position against its owner. Returns true on the first
/// position seen for that owner.
async fn track_account<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    owner: &str,
) -> Result<bool, Error> {
    let (account, new_owner) = match ctx
        .changeset
        .load::<Account>(EntityKind::Account, owner)
        .await?
    {
        Some(mut account) => {
            account.position_count += 1;
            (account, false)
        },
        None => {
            info!("Account {} created", owner);
            let account = Account {
                id: owner.to_owned(),
                position_count: 1,
            };
            (account, true)
        },
    };
    ctx.changeset.save(account);

    Ok(new_owner)
}

async fn update_usage<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    change: UsageChange,
) -> Result<(), Error> {
    if change.is_empty() {
        return Ok(());
    }

    let mut market = market::get_or_create_market(ctx).await?;
    let counts = &mut market.positions;
    if change.created {
        counts.position_count += 1;
        counts.borrowing_position_count += 1;
    }
    if change.opened {
        counts.open_position_count += 1;
    }
    if change.closed {
        counts.open_position_count = counts.open_position_count.saturating_sub(1);
        counts.closed_position_count += 1;
    }
    ctx.changeset.save(market.clone());
    market::refresh_snapshots(ctx, &market).await?;

    let mut protocol = protocol::get_or_create_protocol(ctx).await?;
    let usage = &mut protocol.usage;
    if change.created {
        usage.cumulative_position_count += 1;
    }
    if change.opened {
        usage.open_position_count += 1;
    }
    if change.closed {
        usage.open_position_count = usage.open_position_count.saturating_sub(1);
    }
    if change.new_owner {
        usage.cumulative_unique_users += 1;
        usage.cumulative_unique_borrowers += 1;
    }
    ctx.changeset.save(protocol.clone());
    protocol::refresh_financials(ctx, &protocol).await?;

    Ok(())
}
