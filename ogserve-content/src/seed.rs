use crate::{ContentDetails, ContentRecord, ContentType, PostDetails, ProductDetails};

pub(crate) fn posts() -> Vec<ContentRecord> {
    vec![
        post(
            1,
            "Amazing Post About React SSR",
            "Learn how to implement Server-Side Rendering in React for better SEO and social media previews",
            "https://images.unsplash.com/photo-1633356122544-f134324a6cee?w=1200&h=630&fit=crop",
            "John Doe",
            "2024-01-15",
            "Server-side rendering puts real markup in front of crawlers and link unfurlers before any JavaScript runs.",
        ),
        post(
            2,
            "Social Media Optimization Guide",
            "Complete guide to optimizing your website for social media sharing with Open Graph tags",
            "https://images.unsplash.com/photo-1611162617474-5b21e879e113?w=1200&h=630&fit=crop",
            "Jane Smith",
            "2024-01-20",
            "Open Graph and Twitter Card tags decide how a shared link looks on every major platform.",
        ),
        post(
            3,
            "Building Fast Web Applications",
            "Tips and tricks for building lightning-fast web applications that rank well",
            "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=1200&h=630&fit=crop",
            "Alex Johnson",
            "2024-02-02",
            "Ship less JavaScript, cache aggressively, and render the first view on the server.",
        ),
    ]
}

pub(crate) fn products() -> Vec<ContentRecord> {
    vec![
        product(
            123,
            "Premium Wireless Headphones",
            "High-quality wireless headphones with noise cancellation and 30-hour battery life",
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=1200&h=630&fit=crop",
            299.99,
            "Electronics",
        ),
        product(
            456,
            "Smart Fitness Watch",
            "Track your health and fitness goals with GPS, heart rate monitoring and sleep tracking",
            "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=1200&h=630&fit=crop",
            199.99,
            "Wearables",
        ),
    ]
}

fn post(
    id: u64,
    title: &str,
    description: &str,
    image: &str,
    author: &str,
    date: &str,
    content: &str,
) -> ContentRecord {
    ContentRecord {
        id,
        title: title.to_owned(),
        description: description.to_owned(),
        image: image.to_owned(),
        content_type: ContentType::Article,
        details: ContentDetails::Post(PostDetails {
            author: author.to_owned(),
            date: date.to_owned(),
            content: content.to_owned(),
        }),
    }
}

fn product(
    id: u64,
    title: &str,
    description: &str,
    image: &str,
    price: f64,
    category: &str,
) -> ContentRecord {
    ContentRecord {
        id,
        title: title.to_owned(),
        description: description.to_owned(),
        image: image.to_owned(),
        content_type: ContentType::Product,
        details: ContentDetails::Product(ProductDetails {
            price,
            currency: "USD".to_owned(),
            category: category.to_owned(),
        }),
    }
}
