use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::ArrowError;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use ragline_core::{DocId, Document, Embedding, Error, IndexGateway, Meta, Result, RetrievalResult, RetrievedDocument};

use crate::schema::{build_documents_schema, vector_dim};
use crate::table::{get_meta, index_err, open_db, set_meta, table_exists};
use crate::validate::{check_dimension, sequential_ids, validate_add, validate_top_k};

const NEXT_ID_KEY: &str = "next_id";
const INSERT_BATCH_SIZE: usize = 1000;

/// Persistent index: one LanceDB table per collection plus a `<collection>__meta`
/// table holding the id counter.
///
/// The documents table is created lazily by the first `add`, which also fixes
/// the collection's vector dimension. `clear` deletes rows but keeps the table
/// and the counter.
pub struct LanceIndex {
	db: Connection,
	table_name: String,
	meta_table: String,
	// Serializes writers in this process so counter reads and row inserts stay paired.
	write_lock: Mutex<()>,
}

impl LanceIndex {
	pub async fn new(db_path: &Path, collection: &str) -> Result<Self> {
		if collection.is_empty() {
			return Err(Error::invalid_argument("collection name must not be empty"));
		}
		std::fs::create_dir_all(db_path)?;
		let db = open_db(db_path.to_string_lossy().as_ref()).await?;
		tracing::debug!(target: "index", backend = "lancedb", "opened {} at {}", collection, db_path.display());
		Ok(Self {
			db,
			table_name: collection.to_string(),
			meta_table: format!("{collection}__meta"),
			write_lock: Mutex::new(()),
		})
	}

	pub fn collection(&self) -> &str {
		&self.table_name
	}

	async fn open_table(&self) -> Result<Option<Table>> {
		if !table_exists(&self.db, &self.table_name).await? {
			return Ok(None);
		}
		let table = self.db.open_table(&self.table_name).execute().await.map_err(index_err("failed to open table"))?;
		Ok(Some(table))
	}

	async fn table_dim(&self, table: &Table) -> Result<usize> {
		let schema = table.schema().await.map_err(index_err("failed to read schema"))?;
		vector_dim(&schema).ok_or_else(|| Error::index(format!("table '{}' has no vector column", self.table_name)))
	}

	async fn next_id(&self) -> Result<u64> {
		match get_meta(&self.db, &self.meta_table, NEXT_ID_KEY).await? {
			Some(raw) => raw.parse().map_err(|e| Error::index(format!("corrupt id counter '{raw}': {e}"))),
			None => Ok(0),
		}
	}

	/// The subset of `ids` already stored in `table`.
	async fn taken_ids(&self, table: &Table, ids: &[DocId]) -> Result<HashSet<String>> {
		let quoted: Vec<String> = ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect();
		let mut stream = table
			.query()
			.only_if(format!("id IN ({})", quoted.join(", ")))
			.execute()
			.await
			.map_err(index_err("failed to check ids"))?;
		let mut taken = HashSet::new();
		while let Some(batch) = stream.try_next().await.map_err(index_err("failed to read ids"))? {
			let column = string_column(&batch, "id")?;
			taken.extend((0..batch.num_rows()).map(|i| column.value(i).to_string()));
		}
		Ok(taken)
	}

	/// Writes every batch in one `add` (or `create_table`) call, i.e. one
	/// LanceDB commit: a failed write stores none of the rows.
	async fn insert(&self, table: Option<&Table>, batches: Vec<RecordBatch>) -> Result<()> {
		let Some(schema) = batches.first().map(RecordBatch::schema) else {
			return Ok(());
		};
		let reader = Box::new(RecordBatchIterator::new(batches.into_iter().map(Ok::<_, ArrowError>), schema));
		match table {
			Some(table) => {
				table.add(reader).execute().await.map_err(index_err("failed to add rows"))?;
			}
			None => {
				self.db.create_table(&self.table_name, reader).execute().await.map_err(index_err("failed to create table"))?;
			}
		}
		Ok(())
	}
}

fn to_record_batch(
	ids: &[DocId],
	texts: &[String],
	embeddings: &[Embedding],
	metadata: Option<&[Meta]>,
	dim: usize,
) -> Result<RecordBatch> {
	let dim = i32::try_from(dim).map_err(|_| Error::invalid_argument(format!("dimension {dim} is too large")))?;
	let mut metas = Vec::with_capacity(texts.len());
	for i in 0..texts.len() {
		let meta = metadata.map(|m| &m[i]);
		let json = match meta {
			Some(m) => serde_json::to_string(m).map_err(index_err("failed to encode metadata"))?,
			None => "{}".to_string(),
		};
		metas.push(json);
	}
	let vectors: Vec<Option<Vec<Option<f32>>>> =
		embeddings.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect())).collect();
	RecordBatch::try_new(
		build_documents_schema(dim),
		vec![
			Arc::new(StringArray::from(ids.to_vec())),
			Arc::new(StringArray::from(texts.to_vec())),
			Arc::new(StringArray::from(metas)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim)),
		],
	)
	.map_err(index_err("failed to build record batch"))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| Error::index(format!("column '{name}' missing or not a string")))
}

fn documents_from_batch(batch: &RecordBatch) -> Result<Vec<Document>> {
	let ids = string_column(batch, "id")?;
	let texts = string_column(batch, "text")?;
	let metas = string_column(batch, "metadata")?;
	let mut docs = Vec::with_capacity(batch.num_rows());
	for i in 0..batch.num_rows() {
		let metadata: Meta = if metas.is_null(i) {
			Meta::new()
		} else {
			serde_json::from_str(metas.value(i)).map_err(index_err("failed to decode metadata"))?
		};
		docs.push(Document::new(ids.value(i), texts.value(i)).with_metadata(metadata));
	}
	Ok(docs)
}

#[async_trait]
impl IndexGateway for LanceIndex {
	async fn add(
		&self,
		texts: &[String],
		embeddings: &[Embedding],
		ids: Option<&[DocId]>,
		metadata: Option<&[Meta]>,
	) -> Result<Vec<DocId>> {
		let Some(dim) = validate_add(texts, embeddings, ids, metadata)? else {
			return Ok(Vec::new());
		};
		let _guard = self.write_lock.lock().await;
		let table = self.open_table().await?;
		if let Some(table) = &table {
			check_dimension(self.table_dim(table).await?, dim, "embedding")?;
		}

		let assigned = match ids {
			Some(ids) => {
				if let Some(table) = &table {
					let taken = self.taken_ids(table, ids).await?;
					if let Some(dup) = ids.iter().find(|id| taken.contains(id.as_str())) {
						return Err(Error::invalid_argument(format!("document id '{dup}' already exists")));
					}
				}
				ids.to_vec()
			}
			None => {
				let mut next = self.next_id().await?;
				let mut assigned = Vec::with_capacity(texts.len());
				// Counter values whose id a caller already used explicitly are skipped.
				while assigned.len() < texts.len() {
					let candidates = sequential_ids(next, texts.len() - assigned.len());
					let taken = match &table {
						Some(table) => self.taken_ids(table, &candidates).await?,
						None => HashSet::new(),
					};
					next += candidates.len() as u64;
					assigned.extend(candidates.into_iter().filter(|id| !taken.contains(id)));
				}
				// Advanced before any row is written: a failed write leaves a gap in the ids, never a reuse.
				set_meta(&self.db, &self.meta_table, NEXT_ID_KEY, &next.to_string()).await?;
				assigned
			}
		};

		let mut batches = Vec::with_capacity(texts.len().div_ceil(INSERT_BATCH_SIZE));
		for start in (0..texts.len()).step_by(INSERT_BATCH_SIZE) {
			let end = (start + INSERT_BATCH_SIZE).min(texts.len());
			batches.push(to_record_batch(
				&assigned[start..end],
				&texts[start..end],
				&embeddings[start..end],
				metadata.map(|m| &m[start..end]),
				dim,
			)?);
		}
		self.insert(table.as_ref(), batches).await?;
		tracing::debug!(target: "index", backend = "lancedb", "added {} documents to '{}'", assigned.len(), self.table_name);
		Ok(assigned)
	}

	async fn search(&self, query: &[f32], top_k: usize) -> Result<RetrievalResult> {
		validate_top_k(top_k)?;
		let Some(table) = self.open_table().await? else {
			return Ok(RetrievalResult::default());
		};
		check_dimension(self.table_dim(&table).await?, query.len(), "query vector")?;
		if table.count_rows(None).await.map_err(index_err("failed to count rows"))? == 0 {
			return Ok(RetrievalResult::default());
		}

		let mut stream = table
			.vector_search(query.to_vec())
			.map_err(index_err("invalid query vector"))?
			.distance_type(DistanceType::Cosine)
			.limit(top_k)
			.execute()
			.await
			.map_err(index_err("vector search failed"))?;

		let mut items = Vec::new();
		while let Some(batch) = stream.try_next().await.map_err(index_err("failed to read search results"))? {
			let docs = documents_from_batch(&batch)?;
			let distances = batch
				.column_by_name("_distance")
				.and_then(|c| c.as_any().downcast_ref::<Float32Array>())
				.ok_or_else(|| Error::index("search results lack a _distance column"))?;
			for (i, document) in docs.into_iter().enumerate() {
				// Cosine distance is 1 - similarity.
				items.push(RetrievedDocument { document, score: 1.0 - distances.value(i) });
			}
		}
		items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
		items.truncate(top_k);
		Ok(RetrievalResult::new(items))
	}

	async fn list(&self) -> Result<Vec<Document>> {
		let Some(table) = self.open_table().await? else {
			return Ok(Vec::new());
		};
		let rows = table.count_rows(None).await.map_err(index_err("failed to count rows"))?;
		if rows == 0 {
			return Ok(Vec::new());
		}
		let mut stream = table.query().limit(rows).execute().await.map_err(index_err("failed to scan table"))?;
		let mut docs = Vec::new();
		while let Some(batch) = stream.try_next().await.map_err(index_err("failed to read rows"))? {
			docs.extend(documents_from_batch(&batch)?);
		}
		Ok(docs)
	}

	async fn clear(&self) -> Result<()> {
		let _guard = self.write_lock.lock().await;
		if let Some(table) = self.open_table().await? {
			table.delete("id IS NOT NULL").await.map_err(index_err("failed to clear table"))?;
		}
		tracing::info!(target: "index", backend = "lancedb", "cleared '{}'", self.table_name);
		Ok(())
	}

	async fn count(&self) -> Result<usize> {
		match self.open_table().await? {
			Some(table) => table.count_rows(None).await.map_err(index_err("failed to count rows")),
			None => Ok(0),
		}
	}
}
