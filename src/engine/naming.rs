//! Name allocation for new vSwitches and VMkernel interfaces.
//!
//! The wipe leaves the host with no vSwitches or vmknics, so counting up
//! from zero can't collide with anything that already exists.

/// Monotonic counters for one run. Never reset mid-run.
#[derive(Debug, Default)]
pub struct NamingAllocator {
    next_vswitch: usize,
    next_vmknic: usize,
}

impl NamingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next vSwitch name: `vSwitch0`, `vSwitch1`, ...
    pub fn next_vswitch(&mut self) -> String {
        let name = format!("vSwitch{}", self.next_vswitch);
        self.next_vswitch += 1;
        name
    }

    /// Next VMkernel interface name: `vmk0`, `vmk1`, ...
    pub fn next_vmknic(&mut self) -> String {
        let name = format!("vmk{}", self.next_vmknic);
        self.next_vmknic += 1;
        name
    }
}
