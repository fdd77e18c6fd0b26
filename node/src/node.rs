//! Service assembly and run loop.

use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use kyc_callback::CallbackAdapter;
use kyc_lifecycle::KycLifecycle;
use kyc_nullables::{NullBlobStore, NullRecordStore};
use kyc_rpc::RpcServer;
use kyc_store::{BlobStore, RecordStore};
use kyc_store_lmdb::LmdbEnvironment;
use kyc_types::{SystemClock, UuidGenerator};

use crate::config::{Backend, ServiceConfig};
use crate::shutdown::ShutdownController;
use crate::NodeError;

/// A fully wired gateway instance.
pub struct KycNode {
    rpc: RpcServer,
    shutdown: Arc<ShutdownController>,
    /// Subscribed at construction so a stop issued before serving is seen.
    shutdown_rx: Mutex<Option<broadcast::Receiver<()>>>,
    /// Keeps the environment open for as long as the node lives.
    _env: Option<LmdbEnvironment>,
}

impl KycNode {
    /// Open storage and build every layer on top of it.
    pub fn new(config: ServiceConfig) -> Result<Self, NodeError> {
        config.validate()?;

        let (records, blobs, env) = match config.backend {
            Backend::Lmdb => {
                let env = LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)?;
                let records: Arc<dyn RecordStore> = Arc::new(env.record_store());
                let blobs: Arc<dyn BlobStore> = Arc::new(env.blob_store());
                (records, blobs, Some(env))
            }
            Backend::Memory => {
                tracing::warn!("using in-memory storage, data is lost on exit");
                let records: Arc<dyn RecordStore> = Arc::new(NullRecordStore::new());
                let blobs: Arc<dyn BlobStore> = Arc::new(NullBlobStore::new());
                (records, blobs, None)
            }
        };

        let lifecycle = KycLifecycle::new(
            records,
            blobs,
            Arc::new(SystemClock),
            Arc::new(UuidGenerator),
            config.metadata.clone(),
        );
        let callbacks = Arc::new(CallbackAdapter::new(Arc::new(lifecycle)));
        let rpc = RpcServer::new(config.rpc_port, callbacks).with_body_limit(config.max_upload_bytes);

        info!(
            backend = %config.backend,
            certs = config.metadata.certs.len(),
            required_fields = config.metadata.required_fields.len(),
            max_upload_bytes = config.max_upload_bytes,
            "KYC node initialised"
        );

        let shutdown = Arc::new(ShutdownController::new());
        let shutdown_rx = Mutex::new(Some(shutdown.subscribe()));
        Ok(Self {
            rpc,
            shutdown,
            shutdown_rx,
            _env: env,
        })
    }

    /// Bind the configured port.
    pub async fn bind(&self) -> Result<TcpListener, NodeError> {
        Ok(self.rpc.bind().await?)
    }

    /// Serve until SIGINT/SIGTERM or [`KycNode::stop`].
    pub async fn start(&self) -> Result<(), NodeError> {
        let listener = self.bind().await?;
        let signals = Arc::clone(&self.shutdown);
        tokio::spawn(async move { signals.wait_for_signal().await });
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown is triggered.
    /// A node serves at most once.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), NodeError> {
        let rx = self
            .shutdown_rx
            .lock()
            .map_err(|_| NodeError::AlreadyServing)?
            .take()
            .ok_or(NodeError::AlreadyServing)?;
        self.rpc
            .serve(listener, ShutdownController::on_signal(rx))
            .await?;
        info!("KYC node stopped");
        Ok(())
    }

    /// Trigger graceful shutdown.
    pub fn stop(&self) {
        info!("KYC node stopping");
        self.shutdown.shutdown();
    }
}
