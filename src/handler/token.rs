use std::future::Future;

use bigdecimal::BigDecimal;
use tracing::{info, warn};

use crate::{
    configuration::TokenSettings,
    dao::EntityStore,
    error::Error,
    handler::EventContext,
    helpers::{to_display_amount, DEFAULT_DECIMALS},
    model::{EntityKind, Token},
};

/// External quote collaborator: the USD value of `reference_amount` units
/// of `asset`, or `None` when it has no quote.
pub trait PriceSource: Send + Sync {
    fn quote(
        &self,
        asset: &str,
        reference_amount: &BigDecimal,
    ) -> impl Future<Output = Result<Option<BigDecimal>, Error>> + Send;
}

/// Returns the stored token untouched when it exists, so a cached price
/// survives every later access.
pub async fn get_or_create_token<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    token: &TokenSettings,
) -> Result<Token, Error> {
    if let Some(existing) = ctx
        .changeset
        .load::<Token>(EntityKind::Token, &token.address)
        .await?
    {
        return Ok(existing);
    }

    let created = Token {
        id: token.address.to_owned(),
        name: token.name.to_owned(),
        symbol: token.symbol.to_owned(),
        decimals: token.decimals,
        last_price_usd: None,
        last_price_block_number: None,
    };
    ctx.changeset.save(created.clone());
    info!("Token {} ({}) created", created.symbol, created.id);

    Ok(created)
}

/// Last write wins, in arrival order.
pub async fn set_price<S: EntityStore, P>(
    ctx: &mut EventContext<'_, S, P>,
    address: &str,
    raw_price: &BigDecimal,
) -> Result<Token, Error> {
    let mut token = load_token(ctx, address).await?;
    token.last_price_usd = Some(to_display_amount(raw_price, DEFAULT_DECIMALS));
    token.last_price_block_number = Some(ctx.block_number);
    ctx.changeset.save(token.clone());

    Ok(token)
}

pub async fn current_price<S: EntityStore, P>(
    ctx: &EventContext<'_, S, P>,
    address: &str,
) -> Result<BigDecimal, Error> {
    ctx.changeset
        .load::<Token>(EntityKind::Token, address)
        .await?
        .and_then(|token| token.last_price_usd)
        .ok_or_else(|| Error::MissingPrice {
            asset: address.to_owned(),
        })
}

pub async fn spot_price_external<S: EntityStore, P: PriceSource>(
    ctx: &mut EventContext<'_, S, P>,
    address: &str,
    refresh: bool,
) -> Result<BigDecimal, Error> {
    let mut token = load_token(ctx, address).await?;
    if !refresh {
        if let Some(price) = &token.last_price_usd {
            return Ok(price.clone());
        }
    }

    let price = match ctx.prices.quote(address, &BigDecimal::from(1)).await? {
        Some(price) => price,
        None => {
            let fallback = ctx.settings.price_fallback_usd.clone();
            warn!(
                "No quote for {}, using fallback price {}",
                token.symbol, fallback
            );
            fallback
        },
    };

    token.last_price_usd = Some(price.clone());
    token.last_price_block_number = Some(ctx.block_number);
    ctx.changeset.save(token);

    Ok(price)
}

async fn load_token<S: EntityStore, P>(
    ctx: &EventContext<'_, S, P>,
    address: &str,
) -> Result<Token, Error> {
    ctx.changeset
        .load::<Token>(EntityKind::Token, address)
        .await?
        .ok_or_else(|| Error::NotFound {
            kind: EntityKind::Token,
            id: address.to_owned(),
        })
}
