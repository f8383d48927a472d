use super::{
    interface::{Fix, LocationSubsystem, ProviderHandle, ProviderProperties},
    nmea,
};
use crate::error::AppError;
use std::{
    collections::HashMap,
    io::ErrorKind,
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex, MutexGuard,
    },
};
use tokio::net::UdpSocket;
use tracing::debug;

struct Source {
    name: String,
    socket: UdpSocket,
    enabled: bool,
}

/// Synthetic source backend that streams fixes as NMEA datagrams, e.g. into
/// `gpsd udp://<target>`.
///
/// The trait is synchronous, so sockets are non-blocking and a datagram that
/// cannot be sent right away fails the emission. Registering needs a tokio
/// runtime.
pub struct UdpNmeaSink {
    target: String,
    next_id: AtomicU32,
    sources: Mutex<HashMap<u32, Source>>,
}

impl UdpNmeaSink {
    pub fn new(target: &str) -> Self {
        Self { target: target.to_owned(), next_id: AtomicU32::new(1), sources: Mutex::new(HashMap::new()) }
    }

    fn sources(&self) -> MutexGuard<'_, HashMap<u32, Source>> {
        self.sources.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn registered(&self) -> usize {
        self.sources().len()
    }
}

impl LocationSubsystem for UdpNmeaSink {
    fn register_synthetic_source(
        &self, name: &str, properties: &ProviderProperties,
    ) -> Result<ProviderHandle, AppError> {
        let mut sources = self.sources();
        if sources.values().any(|s| s.name == name) {
            return Err(AppError::ProviderUnavailable(format!("source '{}' already registered", name)));
        }
        let socket = std::net::UdpSocket::bind("0.0.0.0:0")
            .and_then(|socket| socket.connect(&self.target).map(|_| socket))
            .and_then(|socket| socket.set_nonblocking(true).map(|_| socket))
            .and_then(UdpSocket::from_std)
            .map_err(|e| AppError::ProviderUnavailable(format!("cannot reach {}: {}", self.target, e)))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        sources.insert(id, Source { name: name.to_owned(), socket, enabled: false });
        debug!(provider = name, target = %self.target, accuracy = ?properties.accuracy, "Synthetic source registered.");
        Ok(ProviderHandle::new(id, name))
    }

    fn set_enabled(&self, handle: &ProviderHandle, enabled: bool) -> Result<(), AppError> {
        match self.sources().get_mut(&handle.id) {
            Some(source) => {
                source.enabled = enabled;
                Ok(())
            }
            None => Err(AppError::ProviderUnavailable(format!("unknown source '{}'", handle.name))),
        }
    }

    fn unregister(&self, handle: &ProviderHandle) -> Result<(), AppError> {
        match self.sources().remove(&handle.id) {
            Some(_) => {
                debug!(provider = %handle.name, "Synthetic source removed.");
                Ok(())
            }
            None => Err(AppError::ProviderUnavailable(format!("unknown source '{}'", handle.name))),
        }
    }

    fn push_fix(&self, handle: &ProviderHandle, fix: &Fix) -> Result<(), AppError> {
        let sources = self.sources();
        let source = sources
            .get(&handle.id)
            .ok_or_else(|| AppError::EmissionFailed(format!("unknown source '{}'", handle.name)))?;
        if !source.enabled {
            return Err(AppError::EmissionFailed(format!("source '{}' is disabled", handle.name)));
        }
        match source.socket.try_send(nmea::encode(fix).as_bytes()) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                Err(AppError::EmissionFailed(format!("source '{}' is busy", handle.name)))
            }
            Err(e) => Err(AppError::EmissionFailed(e.to_string())),
        }
    }
}
