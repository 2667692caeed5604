use bigdecimal::BigDecimal;
use tracing::info;

use crate::{
    dao::EntityStore,
    error::Error,
    handler::{protocol, token, EventContext},
    helpers::{bucket_key, to_display_amount, SnapshotPeriod},
    model::{
        EntityKind, Market, MarketMetrics, MarketSnapshot, PeriodTotals,
        PositionCounts,
    },
};

/// Loads the market singleton. On first access the protocol and the
/// collateral token are created along with it.
pub async fn get_or_create_market<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
) -> Result<Market, Error> {
    let settings = ctx.settings;
    if let Some(market) = ctx
        .changeset
        .load::<Market>(EntityKind::Market, &settings.market_id)
        .await?
    {
        return Ok(market);
    }

    let protocol = protocol::get_or_create_protocol(ctx).await?;
    let input_token =
        token::get_or_create_token(ctx, &settings.collateral_token).await?;

    let market = Market {
        id: settings.market_id.to_owned(),
        protocol: protocol.id,
        name: settings.market_name.to_owned(),
        is_active: true,
        can_use_as_collateral: true,
        can_borrow_from: true,
        maximum_ltv: settings.maximum_ltv.clone(),
        liquidation_threshold: settings.maximum_ltv.clone(),
        liquidation_penalty: settings.liquidation_penalty.clone(),
        input_token: input_token.id,
        created_timestamp: settings.market_created_timestamp,
        created_block_number: settings.market_created_block,
        metrics: MarketMetrics::default(),
        positions: PositionCounts::default(),
    };
    ctx.changeset.save(market.clone());
    info!("Market {} created", market.id);

    Ok(market)
}

/// Sets the borrow balance from the pool's raw debt and pushes the same
/// figure to the protocol as an absolute value.
///
/// The scaled debt is stored as USD without a price conversion. This is a
/// known gap: `total_borrow_balance_usd` is denominated in the minted token.
/// The minted token price is copied from the cache when one was recorded;
/// no quote is requested.
pub async fn set_debt<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    raw_debt: &BigDecimal,
) -> Result<Market, Error> {
    let settings = ctx.settings;
    let minted = &settings.minted_token;
    let debt_usd = to_display_amount(raw_debt, minted.decimals);

    let mut market = get_or_create_market(ctx).await?;
    let minted_token = token::get_or_create_token(ctx, minted).await?;

    market.metrics.total_borrow_balance_usd = debt_usd.clone();
    market.metrics.output_token_supply = raw_debt.clone();
    if let Some(price) = minted_token.last_price_usd {
        market.metrics.output_token_price_usd = price;
    }
    ctx.changeset.save(market.clone());
    refresh_snapshots(ctx, &market).await?;

    protocol::update_borrow_balance(ctx, debt_usd, raw_debt.clone()).await?;

    Ok(market)
}

/// Values the pool's collateral at the cached collateral price and pushes
/// the change in locked value to the protocol as a signed delta.
pub async fn set_collateral_balance<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    raw_balance: &BigDecimal,
) -> Result<Market, Error> {
    let settings = ctx.settings;
    let collateral = &settings.collateral_token;
    let price = token::current_price(ctx, &collateral.address).await?;
    let balance_usd = to_display_amount(raw_balance, collateral.decimals) * &price;

    let mut market = get_or_create_market(ctx).await?;
    let net_change_usd = &balance_usd - &market.metrics.total_value_locked_usd;

    market.metrics.total_value_locked_usd = balance_usd.clone();
    market.metrics.total_deposit_balance_usd = balance_usd;
    market.metrics.input_token_balance = raw_balance.clone();
    market.metrics.input_token_price_usd = price;
    ctx.changeset.save(market.clone());
    refresh_snapshots(ctx, &market).await?;

    protocol::update_locked_usd(ctx, &net_change_usd).await?;

    Ok(market)
}

pub async fn refresh_snapshots<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    market: &Market,
) -> Result<(), Error> {
    refresh_snapshot(ctx, market, SnapshotPeriod::Daily).await?;
    refresh_snapshot(ctx, market, SnapshotPeriod::Hourly).await?;
    Ok(())
}

/// Point-in-time fields and the block stamp follow the latest event in the
/// bucket. Period totals are zeroed when the bucket is created and left
/// alone afterwards.
pub async fn refresh_snapshot<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    market: &Market,
    period: SnapshotPeriod,
) -> Result<MarketSnapshot, Error> {
    let id = bucket_key(&market.id, ctx.timestamp, period.seconds())?;
    let kind = EntityKind::market_snapshot(period);

    let mut snapshot =
        match ctx.changeset.load::<MarketSnapshot>(kind, &id).await? {
            Some(snapshot) => snapshot,
            None => MarketSnapshot {
                id,
                period,
                protocol: market.protocol.to_owned(),
                market: market.id.to_owned(),
                block_number: ctx.block_number,
                timestamp: ctx.timestamp,
                metrics: MarketMetrics::default(),
                period_totals: PeriodTotals::default(),
            },
        };

    snapshot.metrics = market.metrics.clone();
    snapshot.block_number = ctx.block_number;
    snapshot.timestamp = ctx.timestamp;
    ctx.changeset.save(snapshot.clone());

    Ok(snapshot)
}
