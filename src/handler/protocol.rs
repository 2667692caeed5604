use bigdecimal::BigDecimal;
use tracing::info;

use crate::{
    dao::EntityStore,
    error::Error,
    handler::{token, EventContext},
    helpers::{bucket_key, SECONDS_PER_DAY},
    model::{
        CollateralizationType, EntityKind, FinancialsDailySnapshot,
        LendingProtocol, LendingType, Network, PeriodTotals, PermissionType,
        ProtocolMetrics, ProtocolType, ProtocolUsage, RiskType,
    },
};

/// Loads the protocol singleton, creating it on first access. The version
/// stamp is refreshed and the record saved on every call.
pub async fn get_or_create_protocol<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
) -> Result<LendingProtocol, Error> {
    let settings = ctx.settings;
    let mut protocol = match ctx
        .changeset
        .load::<LendingProtocol>(EntityKind::Protocol, &settings.protocol_id)
        .await?
    {
        Some(protocol) => protocol,
        None => {
            let minted =
                token::get_or_create_token(ctx, &settings.minted_token).await?;
            info!("Protocol {} created", settings.protocol_id);

            LendingProtocol {
                id: settings.protocol_id.to_owned(),
                protocol: settings.protocol_name.to_owned(),
                name: settings.protocol_name.to_owned(),
                slug: settings.protocol_slug.to_owned(),
                network: Network::Mainnet,
                protocol_type: ProtocolType::Lending,
                lending_type: LendingType::Cdp,
                lender_permission_type: PermissionType::Permissionless,
                borrower_permission_type: PermissionType::Permissionless,
                pool_creator_permission_type: PermissionType::Admin,
                risk_type: RiskType::Isolated,
                collateralization_type:
                    CollateralizationType::OverCollateralized,
                minted_tokens: vec![minted.id],
                schema_version: String::new(),
                indexer_version: String::new(),
                methodology_version: String::new(),
                metrics: ProtocolMetrics {
                    minted_token_supplies: vec![BigDecimal::from(0)],
                    ..ProtocolMetrics::default()
                },
                usage: ProtocolUsage {
                    total_pool_count: 1,
                    ..ProtocolUsage::default()
                },
            }
        },
    };

    protocol.schema_version = settings.schema_version.to_owned();
    protocol.indexer_version = settings.indexer_version().to_owned();
    protocol.methodology_version = settings.methodology_version.to_owned();
    ctx.changeset.save(protocol.clone());

    Ok(protocol)
}

/// Adds a signed locked-value change coming from one market.
pub async fn update_locked_usd<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    net_change_usd: &BigDecimal,
) -> Result<LendingProtocol, Error> {
    let mut protocol = get_or_create_protocol(ctx).await?;
    let locked = &protocol.metrics.total_value_locked_usd + net_change_usd;
    protocol.metrics.total_deposit_balance_usd = locked.clone();
    protocol.metrics.total_value_locked_usd = locked;
    ctx.changeset.save(protocol.clone());
    refresh_financials(ctx, &protocol).await?;

    Ok(protocol)
}

/// Overwrites the borrow balance and the minted supply list.
pub async fn update_borrow_balance<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    borrowed_usd: BigDecimal,
    total_minted_supply: BigDecimal,
) -> Result<LendingProtocol, Error> {
    let mut protocol = get_or_create_protocol(ctx).await?;
    protocol.metrics.total_borrow_balance_usd = borrowed_usd;
    protocol.metrics.minted_token_supplies = vec![total_minted_supply];
    ctx.changeset.save(protocol.clone());
    refresh_financials(ctx, &protocol).await?;

    Ok(protocol)
}

pub async fn refresh_financials<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    protocol: &LendingProtocol,
) -> Result<FinancialsDailySnapshot, Error> {
    let id = bucket_key(&protocol.id, ctx.timestamp, SECONDS_PER_DAY)?;
    let mut snapshot = match ctx
        .changeset
        .load::<FinancialsDailySnapshot>(EntityKind::FinancialsDailySnapshot, &id)
        .await?
    {
        Some(snapshot) => snapshot,
        None => FinancialsDailySnapshot {
            id,
            protocol: protocol.id.to_owned(),
            block_number: ctx.block_number,
            timestamp: ctx.timestamp,
            metrics: ProtocolMetrics::default(),
            period_totals: PeriodTotals::default(),
        },
    };

    snapshot.metrics = protocol.metrics.clone();
    snapshot.block_number = ctx.block_number;
    snapshot.timestamp = ctx.timestamp;
    ctx.changeset.save(snapshot.clone());

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{
        configuration::IndexerSettings,
        dao::MemoryStore,
        handler::testing::{context, StaticPrices},
        model::Token,
    };

    #[tokio::test]
    async fn test_protocol_created_once_with_metadata() {
        let store = MemoryStore::new();
        let prices = StaticPrices::default();
        let settings = IndexerSettings::default();
        let mut ctx = context(&store, &prices, &settings, 1, 100);

        let protocol = get_or_create_protocol(&mut ctx).await.unwrap();
        assert_eq!(protocol.id, settings.protocol_id);
        assert_eq!(protocol.lending_type, LendingType::Cdp);
        assert_eq!(protocol.usage.total_pool_count, 1);
        assert_eq!(
            protocol.metrics.minted_token_supplies,
            vec![BigDecimal::from(0)]
        );
        assert_eq!(protocol.indexer_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(protocol.minted_tokens, vec![settings.minted_token.address.clone()]);

        let minted: Option<Token> = ctx
            .changeset
            .load(EntityKind::Token, &settings.minted_token.address)
            .await
            .unwrap();
        assert!(minted.is_some());

        let again = get_or_create_protocol(&mut ctx).await.unwrap();
        assert_eq!(again, protocol);
    }

    #[tokio::test]
    async fn test_version_stamp_refreshed_on_access() {
        let store = MemoryStore::new();
        let prices = StaticPrices::default();
        let settings = IndexerSettings::default();
        let ctx = {
            let mut ctx = context(&store, &prices, &settings, 1, 100);
            get_or_create_protocol(&mut ctx).await.unwrap();
            ctx
        };
        ctx.changeset.commit().await.unwrap();

        let upgraded = IndexerSettings {
            schema_version: String::from("3.1.0"),
            ..IndexerSettings::default()
        };
        let mut ctx = context(&store, &prices, &upgraded, 2, 200);
        let protocol = get_or_create_protocol(&mut ctx).await.unwrap();
        assert_eq!(protocol.schema_version, "3.1.0");
        assert_eq!(
            ctx.changeset.journal(),
            &[(EntityKind::Protocol, settings.protocol_id.clone())]
        );
    }

    #[tokio::test]
    async fn test_locked_value_accumulates_deltas() {
        let store = MemoryStore::new();
        let prices = StaticPrices::default();
        let settings = IndexerSettings::default();
        let mut ctx = context(&store, &prices, &settings, 1, 100);

        update_locked_usd(&mut ctx, &BigDecimal::from(6000)).await.unwrap();
        let protocol = update_locked_usd(
            &mut ctx,
            &BigDecimal::from_str("-1500.5").unwrap(),
        )
        .await
        .unwrap();

        let expected = BigDecimal::from_str("4499.5").unwrap();
        assert_eq!(protocol.metrics.total_value_locked_usd, expected);
        assert_eq!(protocol.metrics.total_deposit_balance_usd, expected);

        let snapshot: FinancialsDailySnapshot = ctx
            .changeset
            .load(EntityKind::FinancialsDailySnapshot, "cdp-manager-0")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.metrics.total_value_locked_usd, expected);
    }

    #[tokio::test]
    async fn test_borrow_balance_is_absolute() {
        let store = MemoryStore::new();
        let prices = StaticPrices::default();
        let settings = IndexerSettings::default();
        let mut ctx = context(&store, &prices, &settings, 1, 100);

        update_borrow_balance(&mut ctx, BigDecimal::from(5), BigDecimal::from(5_000))
            .await
            .unwrap();
        let protocol = update_borrow_balance(
            &mut ctx,
            BigDecimal::from(2),
            BigDecimal::from(2_000),
        )
        .await
        .unwrap();

        assert_eq!(protocol.metrics.total_borrow_balance_usd, BigDecimal::from(2));
        assert_eq!(
            protocol.metrics.minted_token_supplies,
            vec![BigDecimal::from(2_000)]
        );
    }

    #[tokio::test]
    async fn test_financials_keep_period_totals_across_refresh() {
        let store = MemoryStore::new();
        let prices = StaticPrices::default();
        let settings = IndexerSettings::default();
        let mut ctx = context(&store, &prices, &settings, 1, 100);

        let protocol = get_or_create_protocol(&mut ctx).await.unwrap();
        let mut snapshot = refresh_financials(&mut ctx, &protocol).await.unwrap();
        snapshot.period_totals.deposit_usd = BigDecimal::from(42);
        ctx.changeset.save(snapshot);

        ctx.block_number = 2;
        ctx.timestamp = 86_399;
        let snapshot = refresh_financials(&mut ctx, &protocol).await.unwrap();
        assert_eq!(snapshot.id, "cdp-manager-0");
        assert_eq!(snapshot.period_totals.deposit_usd, BigDecimal::from(42));
        assert_eq!(snapshot.block_number, 2);
        assert_eq!(snapshot.timestamp, 86_399);

        ctx.timestamp = 86_400;
        let next = refresh_financials(&mut ctx, &protocol).await.unwrap();
        assert_eq!(next.id, "cdp-manager-1");
        assert_eq!(next.period_totals, PeriodTotals::default());
    }
}
