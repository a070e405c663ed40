//! Catalog commands.

use mangaverse_core::ProductId;
use tracing::info;

use super::{CommandError, Context};

/// List every product.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let products = ctx.catalog().list_products().await?;

    for product in &products {
        let availability = if product.in_stock() { "" } else { "  (out of stock)" };
        info!(
            "{}  {} by {}  ${}{availability}",
            product.id,
            product.title,
            product.author,
            product.price.to_fixed()
        );
    }
    info!(count = products.len(), "Catalog listed");
    Ok(())
}

/// Show one product in detail.
///
/// # Errors
///
/// Returns an error if the product does not exist or the request fails.
pub async fn show(ctx: &Context, id: &ProductId) -> Result<(), CommandError> {
    let product = ctx.catalog().product(id).await?;

    info!("{} by {}", product.title, product.author);
    info!("  Price: ${}", product.price.to_fixed());
    if let Some(description) = &product.description {
        info!("  {description}");
    }
    let details = [
        ("ISBN", product.isbn.as_deref()),
        ("Category", product.category.as_deref()),
        ("Sub-category", product.sub_category.as_deref()),
        ("Language", product.language.as_deref()),
        ("Publisher", product.publisher.as_deref()),
        ("Published", product.publication_date.as_deref()),
    ];
    for (label, value) in details {
        if let Some(value) = value {
            info!("  {label}: {value}");
        }
    }
    if let Some(pages) = product.pages {
        info!("  Pages: {pages}");
    }
    match product.stock {
        Some(0) => info!("  Out of stock"),
        Some(stock) => info!("  In stock: {stock}"),
        None => {}
    }
    if let (Some(rating), Some(reviews)) = (product.average_rating, product.number_of_reviews) {
        info!("  Rating: {rating:.1} ({reviews} reviews)");
    }
    Ok(())
}
