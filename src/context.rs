use std::collections::HashMap;

/// A variable value and whether it is passed on to spawned processes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextEntry {
    pub value: String,
    pub export: bool,
}

/// Variables visible to a running script.
///
/// Names are stored the way scripts reference them, without the `$`:
/// `HOME`, `1`, `@`, `-v`, `?-v`.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, ContextEntry>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a context from the command line and the process environment.
    ///
    /// `args[0]` is the script path and becomes `$0`, the rest become `$1`,
    /// `$2`, ... and `$@` joins them with spaces. An argument starting with
    /// `-` also binds `$<flag>` to the argument after it and `$?<flag>` to
    /// `true`. Environment variables are exported and override
    /// argument-derived names.
    pub fn from_process<I>(args: &[String], env: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut ctx = Self::new();
        ctx.set("@", args.iter().skip(1).cloned().collect::<Vec<_>>().join(" "), false);

        for (i, arg) in args.iter().enumerate() {
            ctx.set(i.to_string(), arg.clone(), false);
            if arg.starts_with('-') {
                let next = args.get(i + 1).cloned().unwrap_or_default();
                ctx.set(arg.clone(), next, false);
                ctx.set(format!("?{arg}"), "true", false);
            }
        }

        for (key, value) in env {
            ctx.set(key, value, true);
        }
        ctx
    }

    pub fn get(&self, name: &str) -> Option<&ContextEntry> {
        self.vars.get(name)
    }

    /// The value of `name`, or the empty string when it is unbound.
    pub fn value(&self, name: &str) -> &str {
        self.vars.get(name).map(|e| e.value.as_str()).unwrap_or_default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, export: bool) {
        self.vars.insert(
            name.into(),
            ContextEntry {
                value: value.into(),
                export,
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> Option<ContextEntry> {
        self.vars.remove(name)
    }

    /// An independent copy; changes to it never reach `self`.
    pub fn derive(&self) -> Self {
        self.clone()
    }

    /// The `name=value` pairs handed to spawned processes.
    pub fn exported(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .filter(|(_, entry)| entry.export)
            .map(|(name, entry)| (name.as_str(), entry.value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positional_arguments() {
        let ctx = Context::from_process(&args(&["setup.crosh", "one", "two"]), Vec::new());
        assert_eq!(ctx.value("0"), "setup.crosh");
        assert_eq!(ctx.value("1"), "one");
        assert_eq!(ctx.value("2"), "two");
        assert_eq!(ctx.value("@"), "one two");
        assert_eq!(ctx.value("3"), "");
    }

    #[test]
    fn flags_bind_next_argument_and_presence() {
        let ctx = Context::from_process(&args(&["s.crosh", "--prefix", "/opt", "-v"]), Vec::new());
        assert_eq!(ctx.value("--prefix"), "/opt");
        assert_eq!(ctx.value("?--prefix"), "true");
        assert_eq!(ctx.value("-v"), "");
        assert_eq!(ctx.value("?-v"), "true");
        assert!(ctx.get("?-x").is_none());
    }

    #[test]
    fn environment_is_exported_and_wins() {
        let env = vec![("HOME".to_string(), "/home/me".to_string()), ("1".to_string(), "env".to_string())];
        let ctx = Context::from_process(&args(&["s.crosh", "arg"]), env);
        assert_eq!(ctx.get("HOME"), Some(&ContextEntry { value: "/home/me".into(), export: true }));
        assert_eq!(ctx.value("1"), "env");
        assert!(!ctx.get("0").is_some_and(|e| e.export));
    }

    #[test]
    fn derived_copy_is_independent() {
        let mut ctx = Context::new();
        ctx.set("a", "1", false);
        let mut child = ctx.derive();
        child.set("a", "2", true);
        child.set("b", "3", false);
        assert_eq!(ctx.value("a"), "1");
        assert!(ctx.get("b").is_none());
    }

    #[test]
    fn only_exported_entries_are_listed() {
        let mut ctx = Context::new();
        ctx.set("PATH", "/bin", true);
        ctx.set("local", "x", false);
        let exported: Vec<_> = ctx.exported().collect();
        assert_eq!(exported, vec![("PATH", "/bin")]);
    }
}
