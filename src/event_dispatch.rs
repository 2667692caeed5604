use crate::{
    dao::EntityStore,
    error::Error,
    handler::{market, position, token, EventContext, PriceSource},
    helpers::parse_raw_amount,
    types::EventPayload,
};

pub async fn dispatch<S: EntityStore, P: PriceSource>(
    ctx: &mut EventContext<'_, S, P>,
    payload: &EventPayload,
) -> Result<(), Error> {
    match payload {
        EventPayload::PositionUpdated {
            position_id,
            owner,
            collateral,
            debt,
        } => {
            let collateral = parse_raw_amount(collateral)?;
            let debt = parse_raw_amount(debt)?;
            position::apply_update(
                ctx,
                position_id,
                owner.as_deref(),
                collateral,
                debt,
            )
            .await?;
        },
        EventPayload::CollateralBalanceUpdated { balance } => {
            let balance = parse_raw_amount(balance)?;
            market::set_collateral_balance(ctx, &balance).await?;
        },
        EventPayload::DebtUpdated { debt } => {
            let debt = parse_raw_amount(debt)?;
            market::set_debt(ctx, &debt).await?;
        },
        EventPayload::CollateralPriceUpdated { price } => {
            let price = parse_raw_amount(price)?;
            let settings = ctx.settings;
            let collateral = &settings.collateral_token;
            token::get_or_create_token(ctx, collateral).await?;
            token::set_price(ctx, &collateral.address, &price).await?;
        },
    };

    Ok(())
}
