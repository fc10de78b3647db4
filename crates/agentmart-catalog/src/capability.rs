//! The ten marketplace capabilities and their static metadata

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named agent service offered on the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Summarize,
    Translate,
    RedditPost,
    TwitterPost,
    TokenSwap,
    PriceFeed,
    WebScrape,
    WeatherData,
    SendEmail,
    MultiNotify,
}

/// UI metadata attached to catalog entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayInfo {
    pub icon: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
    pub color: &'static str,
    pub category: &'static str,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::Summarize,
        Capability::Translate,
        Capability::RedditPost,
        Capability::TwitterPost,
        Capability::TokenSwap,
        Capability::PriceFeed,
        Capability::WebScrape,
        Capability::WeatherData,
        Capability::SendEmail,
        Capability::MultiNotify,
    ];

    /// Catalog slug, e.g. `price-feed`
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Translate => "translate",
            Self::RedditPost => "reddit-post",
            Self::TwitterPost => "twitter-post",
            Self::TokenSwap => "token-swap",
            Self::PriceFeed => "price-feed",
            Self::WebScrape => "web-scrape",
            Self::WeatherData => "weather-data",
            Self::SendEmail => "send-email",
            Self::MultiNotify => "multi-notify",
        }
    }

    /// Name of the callable function exposed to the model
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Summarize => "call_summarizer",
            Self::Translate => "call_translator",
            Self::RedditPost => "call_reddit_agent",
            Self::TwitterPost => "call_twitter_agent",
            Self::TokenSwap => "call_swap_agent",
            Self::PriceFeed => "call_price_oracle",
            Self::WebScrape => "call_web_scraper",
            Self::WeatherData => "call_weather_agent",
            Self::SendEmail => "call_email_agent",
            Self::MultiNotify => "call_notification_agent",
        }
    }

    /// Key used in the deployment file
    pub fn deployment_key(&self) -> &'static str {
        match self {
            Self::Summarize => "summarizer",
            Self::Translate => "translator",
            Self::RedditPost => "reddit",
            Self::TwitterPost => "twitter",
            Self::TokenSwap => "swap",
            Self::PriceFeed => "priceOracle",
            Self::WebScrape => "webScraper",
            Self::WeatherData => "weather",
            Self::SendEmail => "email",
            Self::MultiNotify => "notification",
        }
    }

    /// Price per call in MNEE
    pub fn price(&self) -> Decimal {
        match self {
            Self::Summarize => dec!(0.02),
            Self::Translate => dec!(0.03),
            Self::RedditPost => dec!(0.04),
            Self::TwitterPost => dec!(0.05),
            Self::TokenSwap => dec!(0.1),
            Self::PriceFeed => dec!(0.01),
            Self::WebScrape => dec!(0.06),
            Self::WeatherData => dec!(0.02),
            Self::SendEmail => dec!(0.03),
            Self::MultiNotify => dec!(0.04),
        }
    }

    /// Human-readable agent name as shown in the catalog
    pub fn agent_title(&self) -> &'static str {
        match self {
            Self::Summarize => "Summarizer Agent",
            Self::Translate => "Translator Agent",
            Self::RedditPost => "Reddit Agent",
            Self::TwitterPost => "Twitter Agent",
            Self::TokenSwap => "Swap Agent",
            Self::PriceFeed => "Price Oracle Agent",
            Self::WebScrape => "Web Scraper Agent",
            Self::WeatherData => "Weather Agent",
            Self::SendEmail => "Email Agent",
            Self::MultiNotify => "Notification Agent",
        }
    }

    pub fn display(&self) -> DisplayInfo {
        match self {
            Self::Summarize => DisplayInfo {
                icon: "📝",
                description: "Generates concise AI-powered summaries of long text",
                placeholder: "Paste the text you want to summarize here...",
                color: "from-sky-400 to-blue-500",
                category: "AI Services",
            },
            Self::Translate => DisplayInfo {
                icon: "🌐",
                description: "Translates text between multiple languages",
                placeholder: "Enter text to translate (JSON format: {\"text\": \"...\", \"from\": \"English\", \"to\": \"Spanish\"})",
                color: "from-blue-400 to-indigo-500",
                category: "AI Services",
            },
            Self::RedditPost => DisplayInfo {
                icon: "🔴",
                description: "Post to subreddits and read posts - bypasses rate limits",
                placeholder: "Post to r/cryptocurrency: Check out AgentMart - AI agents on blockchain!",
                color: "from-purple-400 to-pink-500",
                category: "Social Media",
            },
            Self::TwitterPost => DisplayInfo {
                icon: "🐦",
                description: "Tweet and read timeline with verified API access",
                placeholder: "Tweet: AgentMart is now live! Hire AI agents and pay with crypto. #Web3 #AI",
                color: "from-cyan-400 to-blue-400",
                category: "Social Media",
            },
            Self::TokenSwap => DisplayInfo {
                icon: "💱",
                description: "Execute token swaps on DEX with best rates",
                placeholder: "Swap 100 USDC for ETH on Uniswap",
                color: "from-emerald-400 to-green-500",
                category: "DeFi",
            },
            Self::PriceFeed => DisplayInfo {
                icon: "📊",
                description: "Real-time cryptocurrency price data from multiple sources",
                placeholder: "Get current price of BTC, ETH, SOL",
                color: "from-green-400 to-emerald-500",
                category: "DeFi",
            },
            Self::WebScrape => DisplayInfo {
                icon: "🕷️",
                description: "Extract data from websites - bypasses anti-bot protection",
                placeholder: "Scrape product prices from https://example.com/products",
                color: "from-orange-400 to-red-500",
                category: "Data Services",
            },
            Self::WeatherData => DisplayInfo {
                icon: "☀️",
                description: "Get weather data for any location worldwide",
                placeholder: "Get weather for San Francisco, CA",
                color: "from-yellow-400 to-orange-500",
                category: "Data Services",
            },
            Self::SendEmail => DisplayInfo {
                icon: "📧",
                description: "Send emails via SMTP on behalf of other agents",
                placeholder: "Email to user@example.com\nSubject: Order Confirmation\nBody: Your order has been confirmed.",
                color: "from-pink-400 to-rose-500",
                category: "Communication",
            },
            Self::MultiNotify => DisplayInfo {
                icon: "🔔",
                description: "Multi-channel notifications: Slack, Discord, Telegram",
                placeholder: "Send alert to #dev-channel: Deployment complete!",
                color: "from-rose-400 to-pink-500",
                category: "Communication",
            },
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.function_name() == name)
    }

    pub fn from_deployment_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.deployment_key() == key)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Display name derived from a function name: `call_price_oracle` -> `price oracle`
pub fn display_name(function_name: &str) -> String {
    function_name.replacen("call_", "", 1).replace('_', " ")
}

/// Capability slug for a free-form agent name: `Weather  Agent` -> `weather-agent`
pub fn slugify(agent_name: &str) -> String {
    let mut slug = String::with_capacity(agent_name.len());
    let mut in_whitespace = false;
    for c in agent_name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_are_consistent() {
        for cap in Capability::ALL {
            assert_eq!(Capability::from_slug(cap.slug()), Some(cap));
            assert_eq!(Capability::from_function_name(cap.function_name()), Some(cap));
            assert_eq!(Capability::from_deployment_key(cap.deployment_key()), Some(cap));
        }
        assert_eq!(Capability::from_function_name("call_unknown"), None);
    }

    #[test]
    fn test_price_oracle() {
        let cap = Capability::from_function_name("call_price_oracle").unwrap();
        assert_eq!(cap, Capability::PriceFeed);
        assert_eq!(cap.price(), dec!(0.01));
        assert_eq!(cap.slug(), "price-feed");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("call_price_oracle"), "price oracle");
        assert_eq!(display_name("call_weather_agent"), "weather agent");
        assert_eq!(display_name("call_summarizer"), "summarizer");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("Weather Agent"), "weather-agent");
        assert_eq!(slugify("price   oracle"), "price-oracle");
        assert_eq!(slugify("Swap\tAgent "), "swap-agent-");
    }

    #[test]
    fn test_serde_uses_slug() {
        assert_eq!(
            serde_json::to_value(Capability::MultiNotify).unwrap(),
            "multi-notify"
        );
        let parsed: Capability = serde_json::from_value(serde_json::json!("token-swap")).unwrap();
        assert_eq!(parsed, Capability::TokenSwap);
    }
}
