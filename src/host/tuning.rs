//! NIC offload and TCP MTU tuning
//!
//! Hardware TX offload interacts badly with the tunneled management path, so
//! it is switched off on the interface carrying that traffic; TCP MTU probing
//! is enabled globally so connections recover from path-MTU mismatches. The
//! two steps are independent and non-transactional.

use tracing::info;

use crate::error::{Error, Result};
use crate::host::command::CommandRunner;

const ETHTOOL: &str = "/usr/sbin/ethtool";
const SYSCTL: &str = "/usr/sbin/sysctl";

/// Applies best-effort network tuning on the host.
pub struct InterfaceTuner<R> {
    runner: R,
}

impl<R: CommandRunner> InterfaceTuner<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Disable hardware TX checksum/segmentation offload on `interface`.
    pub fn disable_tx_offload(&self, interface: &str) -> Result<()> {
        let output = self
            .runner
            .run(ETHTOOL, &["--offload", interface, "tx", "off"])
            .map_err(|e| Error::OffloadDisableFailed {
                interface: interface.to_string(),
                detail: e.to_string(),
            })?;
        if !output.success {
            return Err(Error::OffloadDisableFailed {
                interface: interface.to_string(),
                detail: output.combined,
            });
        }

        info!("disabled TX offload on {}", interface);
        Ok(())
    }

    /// Enable TCP MTU probing. This is a host-global sysctl, not scoped to
    /// any interface, and is not reverted by this component.
    pub fn enable_mtu_probing(&self) -> Result<()> {
        let output = self
            .runner
            .run(SYSCTL, &["-w", "net.ipv4.tcp_mtu_probing=1"])
            .map_err(|e| Error::MtuProbingEnableFailed {
                detail: e.to_string(),
            })?;
        if !output.success {
            return Err(Error::MtuProbingEnableFailed {
                detail: output.combined,
            });
        }

        info!("enabled TCP MTU probing");
        Ok(())
    }
}
