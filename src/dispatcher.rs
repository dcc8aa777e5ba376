//! Routes incoming named requests to the owning capability and normalizes
//! outcomes into success/error replies.

use std::sync::Arc;

use serde_json::Value;

use crate::camera::storage::CaptureStorage;
use crate::camera::{CameraSession, DeviceProvider, LensDirection};
use crate::error::BridgeError;
use crate::files::FileQuery;
use crate::permissions::{Capability, GrantAll, PermissionOracle};
use crate::process::{AllowList, ProcessGateway};
use crate::rpc::{Reply, Request};

/// Dispatches commands to the camera session, the process gateway, or the
/// file-query collaborator. Produces exactly one reply per request.
pub struct CommandDispatcher {
    permissions: Arc<dyn PermissionOracle>,
    camera: CameraSession,
    gateway: ProcessGateway,
    files: FileQuery,
}

impl CommandDispatcher {
    pub fn new(
        permissions: Arc<dyn PermissionOracle>,
        camera: CameraSession,
        gateway: ProcessGateway,
        files: FileQuery,
    ) -> Self {
        Self {
            permissions,
            camera,
            gateway,
            files,
        }
    }

    /// Wire up a dispatcher with platform-default storage, the built-in
    /// allow-list, and permissions granted (for hosts that resolve them
    /// before commands reach the bridge). Must be called inside a tokio
    /// runtime.
    pub fn with_defaults(provider: Arc<dyn DeviceProvider>) -> Self {
        let storage = CaptureStorage::platform_default();
        let files = FileQuery::new(storage.private_dir().to_path_buf());
        Self::new(
            Arc::new(GrantAll),
            CameraSession::new(provider, storage),
            ProcessGateway::new(AllowList::builtin()),
            files,
        )
    }

    /// The camera session owned by this dispatcher.
    pub fn camera(&self) -> &CameraSession {
        &self.camera
    }

    /// Handle one request and produce its reply.
    pub async fn handle(&self, request: Request) -> Reply {
        let outcome = self.dispatch(&request).await;
        match &outcome {
            Ok(_) => log::info!("command '{}' completed", request.command),
            Err(e) => log::warn!("command '{}' failed: {} [{}]", request.command, e, e.code()),
        }
        match outcome {
            Ok(payload) => Reply::success(payload),
            Err(e) => Reply::from(&e),
        }
    }

    async fn dispatch(&self, request: &Request) -> Result<Option<Value>, BridgeError> {
        match request.command.as_str() {
            "takePicture" => self.take_picture(request).await,
            "disposeCamera" => {
                self.camera.dispose();
                Ok(None)
            }
            "listFiles" => self.list_files(request),
            "executeShellCommand" => self.execute_shell_command(request).await,
            other => Err(BridgeError::NotImplemented(other.to_string())),
        }
    }

    async fn take_picture(&self, request: &Request) -> Result<Option<Value>, BridgeError> {
        if !self.permissions.is_granted(Capability::Camera) {
            return Err(BridgeError::PermissionDenied);
        }
        let lens = LensDirection::parse(request.arg_str("lensDirection"));
        self.camera.start(lens).await?;
        let image = self.camera.capture().await?;
        Ok(Some(Value::String(
            image.absolute_path.to_string_lossy().into_owned(),
        )))
    }

    fn list_files(&self, request: &Request) -> Result<Option<Value>, BridgeError> {
        let listing = self.files.list(request.arg_str("path"))?;
        Ok(Some(serde_json::to_value(listing).unwrap_or(Value::Null)))
    }

    async fn execute_shell_command(&self, request: &Request) -> Result<Option<Value>, BridgeError> {
        let command_key = request.arg_str("command").unwrap_or_default();
        let supplied_args = request.arg_str_list("args");
        let result = self.gateway.run(command_key, &supplied_args).await?;
        Ok(Some(serde_json::to_value(result).unwrap_or(Value::Null)))
    }
}
