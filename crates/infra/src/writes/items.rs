use async_trait::async_trait;
use sqlx::SqliteConnection;

use commissary_auth::Action;
use commissary_core::ItemId;
use commissary_inventory::{Barcode, BarcodeAllocator, Item, NewItem};

use crate::allocation;
use crate::error::PipelineError;
use crate::pipeline::{Applied, DomainWrite, WriteEnv};
use crate::records;

/// Create an item and allocate its barcode.
#[derive(Debug, Clone)]
pub struct CreateItem(pub NewItem);

#[async_trait]
impl DomainWrite for CreateItem {
    type Output = Item;

    fn action(&self) -> Action {
        Action::CreateItem
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<Item>, PipelineError> {
        let new_item = self.0;
        let allocator = BarcodeAllocator::new(new_item.type_code.clone(), new_item.size_code.clone());
        let now = env.now;

        let item = allocation::insert_with_new_barcode(conn, &allocator, env.serials, |barcode| {
            new_item.clone().into_item(ItemId::new(), barcode, now)
        })
        .await?;

        let detail = format!("Item {} ({}) added with barcode {}", item.name, item.type_code, item.barcode);
        Ok(Applied::new(item, detail))
    }
}

/// Write off an in-stock item; its barcode is never reissued.
#[derive(Debug, Clone)]
pub struct RetireItem {
    pub barcode: Barcode,
    pub reason: String,
}

#[async_trait]
impl DomainWrite for RetireItem {
    type Output = Item;

    fn action(&self) -> Action {
        Action::RetireItem
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<Item>, PipelineError> {
        let mut item = records::require_item(conn, &self.barcode).await?;
        item.retire()?;
        records::save_item_state(conn, &item).await?;
        records::retire_barcode(conn, &item.barcode, env.now, &self.reason).await?;

        let detail = format!("Item {} retired: {}", item.barcode, self.reason);
        Ok(Applied::new(item, detail))
    }
}
