/// Construction options shared by modules and containers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Mode a freshly built module starts in. `true` is training mode.
    pub train: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        ModuleConfig { train: true }
    }
}

impl ModuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial mode (`true` = train, `false` = eval).
    pub fn train(mut self, train: bool) -> Self {
        self.train = train;
        self
    }

    /// Shorthand for a config whose modules start in eval mode.
    pub fn eval() -> Self {
        ModuleConfig { train: false }
    }
}
