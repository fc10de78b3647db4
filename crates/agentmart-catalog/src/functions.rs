//! Callable function definitions offered to the model

use agentmart_llm::ToolSpec;
use serde_json::{json, Value};

use crate::capability::Capability;

/// JSON-schema parameters for a capability's function
pub fn parameters(capability: Capability) -> Value {
    match capability {
        Capability::Summarize => json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "The text to summarize" }
            },
            "required": ["text"]
        }),
        Capability::Translate => json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "The text to translate" },
                "from": {
                    "type": "string",
                    "description": "Source language (e.g., 'English', 'Spanish', 'French')"
                },
                "to": {
                    "type": "string",
                    "description": "Target language (e.g., 'English', 'Spanish', 'French')"
                }
            },
            "required": ["text", "from", "to"]
        }),
        Capability::RedditPost => json!({
            "type": "object",
            "properties": {
                "subreddit": {
                    "type": "string",
                    "description": "The subreddit name (without r/ prefix, e.g., 'cryptocurrency')"
                },
                "content": { "type": "string", "description": "The content to post" }
            },
            "required": ["subreddit", "content"]
        }),
        Capability::TwitterPost => json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The tweet content (max 280 characters)"
                }
            },
            "required": ["content"]
        }),
        Capability::TokenSwap => json!({
            "type": "object",
            "properties": {
                "amount": { "type": "number", "description": "Amount of tokens to swap" },
                "from_token": {
                    "type": "string",
                    "description": "Token to swap from (e.g., 'USDC', 'ETH', 'BTC')"
                },
                "to_token": {
                    "type": "string",
                    "description": "Token to swap to (e.g., 'USDC', 'ETH', 'BTC')"
                }
            },
            "required": ["amount", "from_token", "to_token"]
        }),
        Capability::PriceFeed => json!({
            "type": "object",
            "properties": {
                "tokens": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Array of token symbols (e.g., ['BTC', 'ETH', 'SOL'])"
                }
            },
            "required": ["tokens"]
        }),
        Capability::WebScrape => json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "The URL to scrape" }
            },
            "required": ["url"]
        }),
        Capability::WeatherData => json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City and state/country (e.g., 'San Francisco, CA' or 'Tokyo, Japan')"
                }
            },
            "required": ["location"]
        }),
        Capability::SendEmail => json!({
            "type": "object",
            "properties": {
                "to": { "type": "string", "description": "Recipient email address" },
                "subject": { "type": "string", "description": "Email subject" },
                "body": { "type": "string", "description": "Email body content" }
            },
            "required": ["to", "subject", "body"]
        }),
        Capability::MultiNotify => json!({
            "type": "object",
            "properties": {
                "channel": {
                    "type": "string",
                    "description": "Channel name (e.g., '#dev-channel', '#alerts')"
                },
                "message": { "type": "string", "description": "Notification message" }
            },
            "required": ["channel", "message"]
        }),
    }
}

fn summary(capability: Capability) -> &'static str {
    match capability {
        Capability::Summarize => "Generate a concise summary of long text using AI",
        Capability::Translate => "Translate text between languages",
        Capability::RedditPost => "Post content to a subreddit or read Reddit posts",
        Capability::TwitterPost => "Post a tweet to Twitter",
        Capability::TokenSwap => "Execute a token swap on a decentralized exchange",
        Capability::PriceFeed => "Get real-time cryptocurrency prices",
        Capability::WebScrape => "Extract data from a website",
        Capability::WeatherData => "Get weather data for a specific location",
        Capability::SendEmail => "Send an email",
        Capability::MultiNotify => "Send multi-channel notifications (Slack, Discord, Telegram)",
    }
}

/// Function definition for one capability, price included in the description
pub fn tool_spec(capability: Capability) -> ToolSpec {
    let mut description = format!("{}. Cost: {} MNEE", summary(capability), capability.price());
    if capability == Capability::TokenSwap {
        description.push_str(" (requires user confirmation)");
    }

    ToolSpec {
        name: capability.function_name().to_string(),
        description,
        parameters: parameters(capability),
    }
}

/// The fixed catalog of callable functions, in catalog order
pub fn tool_specs() -> Vec<ToolSpec> {
    Capability::ALL.into_iter().map(tool_spec).collect()
}
