/// Fallback for themes without a canonical call to action.
pub const DEFAULT_CTA: &str = "Share your prayer in the comments";

/// Canonical call-to-action line per production theme.
pub fn theme_cta(theme_slug: &str) -> &'static str {
    match theme_slug {
        "wedding-joy" => "Tag someone celebrating a wedding this year",
        "money-worry" => "Drop an amen if you trust God as provider",
        "closer-to-jesus" => "What's drawing you closer to Jesus? Share below",
        "empty-nest" => "Tell us about your next season below",
        "health-scare" => "Drop a prayer request if you need healing",
        "losing-loved-one" => "Share who you're remembering today",
        "marriage-distance" => "Tag your spouse and share this blessing",
        "caring-for-parents" => "Share a prayer for your parents below",
        "child-struggles" => "Share a prayer for your children below",
        "retirement-purpose" => "What's your new purpose? Tell us below",
        "past-regrets" => "What are you ready to let go of? Share below",
        "loneliness" => "Tell someone below they are not alone",
        "grandparent-joy" => "Tell us about your grandchildren",
        "purity-struggle" => "What helps you guard your eyes? Share below",
        "faith-dry-season" => "What question is on your heart today?",
        "new-season-fear" => "What new season are you stepping into? Share below",
        _ => DEFAULT_CTA,
    }
}
