use crate::{Attribute, Backend, Error, Item, Result, KEY_ATTRIBUTE};
use scribble_types::PlayerRecord;
use tracing::{debug, info, warn};

const NAME_ATTRIBUTE: &str = "Name";
const HIGH_SCORE_ATTRIBUTE: &str = "HighScore";

fn marshal(record: &PlayerRecord) -> Item {
    Item::from([
        (KEY_ATTRIBUTE.to_string(), Attribute::S(record.id.clone())),
        (NAME_ATTRIBUTE.to_string(), Attribute::S(record.name.clone())),
        (
            HIGH_SCORE_ATTRIBUTE.to_string(),
            Attribute::N(record.high_score.to_string()),
        ),
    ])
}

fn unmarshal(item: &Item) -> Result<PlayerRecord> {
    let string = |name: &'static str| {
        item.get(name)
            .and_then(Attribute::as_s)
            .map(str::to_string)
            .ok_or(Error::Malformed(name))
    };
    let high_score = item
        .get(HIGH_SCORE_ATTRIBUTE)
        .and_then(Attribute::as_n)
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or(Error::Malformed(HIGH_SCORE_ATTRIBUTE))?;

    Ok(PlayerRecord {
        id: string(KEY_ATTRIBUTE)?,
        name: string(NAME_ATTRIBUTE)?,
        high_score,
    })
}

/// Player record client over a table [Backend].
///
/// Holds no cache: every call goes to the backend, so consistency is whatever
/// the backend provides.
#[derive(Clone)]
pub struct Records<B: Backend> {
    backend: B,
}

impl<B: Backend> Records<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store `record`, replacing whatever was stored under its id.
    pub async fn put_record(&self, record: &PlayerRecord) -> Result<()> {
        if let Err(e) = self.backend.put_item(marshal(record)).await {
            warn!("Failed to put player record {}: {}", record.id, e);
            return Err(e);
        }
        info!("Successfully put player record: {:?}", record);
        Ok(())
    }

    pub async fn get_record(&self, id: &str) -> Result<PlayerRecord> {
        match self.backend.get_item(id).await? {
            Some(item) => unmarshal(&item),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    /// Every record in the table, in scan order.
    pub async fn records(&self) -> Result<Vec<PlayerRecord>> {
        let mut records = Vec::new();
        let mut start = None;
        loop {
            let page = self.backend.scan_page(start).await?;
            for item in &page.items {
                records.push(unmarshal(item)?);
            }
            match page.next {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        info!("Successfully retrieved {} player records", records.len());
        for record in &records {
            debug!("{:?}", record);
        }
        Ok(records)
    }

    /// Every record ordered by descending high score. Equal scores keep
    /// their scan order.
    ///
    /// A failed read yields an empty list instead of an error.
    pub async fn high_scores(&self) -> Vec<PlayerRecord> {
        let mut records = match self.records().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to read player records for ranking: {}", e);
                return Vec::new();
            }
        };
        records.sort_by(|a, b| b.high_score.cmp(&a.high_score));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Memory;

    fn records(page_size: usize) -> Records<Memory> {
        Records::new(Memory::with_page_size(page_size))
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let records = records(10);
        let record = PlayerRecord::new("Player1", "First Player", 10);
        records.put_record(&record).await.unwrap();
        assert_eq!(records.get_record("Player1").await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let records = records(10);
        records
            .put_record(&PlayerRecord::new("Player1", "First Player", 10))
            .await
            .unwrap();
        let replacement = PlayerRecord::new("Player1", "Renamed", 5);
        records.put_record(&replacement).await.unwrap();

        assert_eq!(records.get_record("Player1").await.unwrap(), replacement);
        assert_eq!(records.backend().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let records = records(10);
        let err = records.get_record("nobody").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "nobody"));
    }

    #[tokio::test]
    async fn test_get_unavailable_is_distinct_from_missing() {
        let records = records(10);
        records.backend().fail_reads(true);
        let err = records.get_record("nobody").await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_put_unavailable() {
        let records = records(10);
        records.backend().fail_writes(true);
        let err = records
            .put_record(&PlayerRecord::new("Player1", "First Player", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_item() {
        let records = records(10);
        let mut item = marshal(&PlayerRecord::new("Player1", "First Player", 10));
        item.insert(
            HIGH_SCORE_ATTRIBUTE.to_string(),
            Attribute::N("not a number".to_string()),
        );
        records.backend().put_item(item).await.unwrap();

        let err = records.get_record("Player1").await.unwrap_err();
        assert!(matches!(err, Error::Malformed(HIGH_SCORE_ATTRIBUTE)));
    }

    #[tokio::test]
    async fn test_records_across_pages() {
        let records = records(2);
        for i in 0..7 {
            records
                .put_record(&PlayerRecord::new(format!("Player{i}"), "name", i))
                .await
                .unwrap();
        }
        let all = records.records().await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["Player0", "Player1", "Player2", "Player3", "Player4", "Player5", "Player6"]
        );
    }

    #[tokio::test]
    async fn test_records_fail_on_later_page() {
        let records = records(2);
        for i in 0..5 {
            records
                .put_record(&PlayerRecord::new(format!("Player{i}"), "name", i))
                .await
                .unwrap();
        }
        records.backend().fail_scan_after(2);
        let err = records.records().await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_high_scores_ranked() {
        let records = records(1);
        records
            .put_record(&PlayerRecord::new("Player1", "First Player", 10))
            .await
            .unwrap();
        records
            .put_record(&PlayerRecord::new("Player2", "Second Player", 30))
            .await
            .unwrap();
        records
            .put_record(&PlayerRecord::new("Player3", "Third Player", 20))
            .await
            .unwrap();

        let ranked: Vec<_> = records
            .high_scores()
            .await
            .into_iter()
            .map(|r| (r.id, r.high_score))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("Player2".to_string(), 30),
                ("Player3".to_string(), 20),
                ("Player1".to_string(), 10),
            ]
        );
    }

    #[tokio::test]
    async fn test_high_scores_ties_keep_scan_order() {
        let records = records(2);
        for (id, score) in [("a", 5), ("b", 7), ("c", 5), ("d", 7), ("e", 5)] {
            records
                .put_record(&PlayerRecord::new(id, id, score))
                .await
                .unwrap();
        }
        let ranked: Vec<_> = records
            .high_scores()
            .await
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ranked, vec!["b", "d", "a", "c", "e"]);
    }

    #[tokio::test]
    async fn test_high_scores_degrade_to_empty() {
        let records = records(1);
        for i in 0..3 {
            records
                .put_record(&PlayerRecord::new(format!("Player{i}"), "name", i))
                .await
                .unwrap();
        }
        records.backend().fail_scan_after(1);
        assert!(records.high_scores().await.is_empty());
    }
}
