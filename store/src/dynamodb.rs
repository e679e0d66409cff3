use crate::{Attribute, Backend, Error, Item, Page, Result, KEY_ATTRIBUTE};
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use std::collections::HashMap;
use tracing::warn;

/// A DynamoDB table.
#[derive(Clone)]
pub struct DynamoDb {
    client: Client,
    table: String,
}

impl DynamoDb {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Build a client from the ambient AWS configuration (environment,
    /// profile, instance metadata).
    pub async fn from_env(table: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn to_remote(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, attribute)| {
            let value = match attribute {
                Attribute::S(s) => AttributeValue::S(s),
                Attribute::N(n) => AttributeValue::N(n),
            };
            (name, value)
        })
        .collect()
}

fn from_remote(item: &HashMap<String, AttributeValue>) -> Item {
    item.iter()
        .filter_map(|(name, value)| {
            let attribute = match value {
                AttributeValue::S(s) => Attribute::S(s.clone()),
                AttributeValue::N(n) => Attribute::N(n.clone()),
                _ => {
                    warn!("Skipping unsupported attribute type for '{}'", name);
                    return None;
                }
            };
            Some((name.clone(), attribute))
        })
        .collect()
}

impl Backend for DynamoDb {
    async fn put_item(&self, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_remote(item)))
            .send()
            .await
            .map_err(|e| Error::unavailable(aws_sdk_dynamodb::Error::from(e)))?;
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| Error::unavailable(aws_sdk_dynamodb::Error::from(e)))?;
        Ok(output.item().map(from_remote))
    }

    async fn scan_page(&self, start: Option<Item>) -> Result<Page> {
        let output = self
            .client
            .scan()
            .table_name(&self.table)
            .set_exclusive_start_key(start.map(to_remote))
            .send()
            .await
            .map_err(|e| Error::unavailable(aws_sdk_dynamodb::Error::from(e)))?;
        Ok(Page {
            items: output.items().iter().map(from_remote).collect(),
            next: output.last_evaluated_key().map(from_remote),
        })
    }
}
