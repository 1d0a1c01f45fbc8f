use crate::config::Config;
use crate::error::ToolError;
use crate::tools::{
    CreateFolderTool, DeployTool, FileReadTool, FileWriteTool, Interrupt, ShellTool, WeatherTool,
};
use crate::traits::{Tool, ToolOutcome, ToolSpec};
use std::sync::Arc;

/// Fixed name → tool mapping. Lookup is exact and case-sensitive.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The six built-in tools, wired to the config's workspace, endpoints and timeouts.
    pub fn with_builtin_tools(config: &Config, interrupt: Interrupt) -> Self {
        let workspace = config.workspace();
        let mut registry = Self::new();

        registry.register(Arc::new(
            ShellTool::new(&workspace)
                .with_timeout(config.timeouts.command())
                .with_interrupt(interrupt.clone()),
        ));
        registry.register(Arc::new(CreateFolderTool::new(&workspace)));
        registry.register(Arc::new(FileWriteTool::new(&workspace)));
        registry.register(Arc::new(FileReadTool::new(&workspace)));
        registry.register(Arc::new(
            DeployTool::new(&workspace)
                .with_timeout(config.timeouts.deploy())
                .with_interrupt(interrupt),
        ));
        registry.register(Arc::new(WeatherTool::new(
            config.weather_base_url.clone(),
            config.timeouts.weather(),
        )));

        registry
    }

    /// Adds a tool. A tool with the same name replaces the earlier registration.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(pos) = self.tools.iter().position(|t| t.name() == tool.name()) {
            tracing::warn!("Replacing already registered tool: {}", tool.name());
            self.tools[pos] = tool;
        } else {
            self.tools.push(tool);
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn get_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn execute(&self, name: &str, input: serde_json::Value) -> ToolOutcome {
        match self.resolve(name) {
            Some(tool) => tool.execute(input).await,
            None => Err(ToolError::NotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::StubTool;
    use serde_json::json;

    #[test]
    fn resolve_unknown_is_none() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool::ok("get_weather", "sunny")));

        assert!(registry.resolve("get_weather").is_some());
        assert!(registry.resolve("Get_Weather").is_none());
        assert!(registry.resolve("get_weathe").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[tokio::test]
    async fn execute_unknown_is_typed_not_found() {
        let registry = ToolRegistry::new();
        let outcome = registry.execute("launch_rocket", json!(null)).await;
        assert_eq!(outcome, Err(ToolError::NotFound("launch_rocket".into())));
    }

    #[tokio::test]
    async fn later_registration_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool::ok("echo", "first")));
        registry.register(Arc::new(StubTool::ok("echo", "second")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.execute("echo", json!("x")).await.unwrap(), "second");
    }

    #[test]
    fn builtin_tools_registered() {
        let registry = ToolRegistry::with_builtin_tools(&Config::default(), Interrupt::new());
        assert_eq!(
            registry.names(),
            vec![
                "run_command",
                "create_folder",
                "write_file",
                "read_file",
                "deploy_app",
                "get_weather"
            ]
        );
        assert_eq!(registry.get_specs().len(), 6);
    }
}
