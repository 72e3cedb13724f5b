//! Capability scope: the only names a compiled component can reach.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The UI runtime itself (`React`).
    Runtime,
    /// A state or lifecycle hook.
    Hook,
    /// A UI primitive from the component library.
    Primitive,
    Icon,
}

/// Ordered identifier → capability mapping. Order matters: an engine passes
/// the values positionally, matching [`Scope::keys`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    entries: Vec<(String, Capability)>,
}

const HOOKS: &[&str] = &["useState", "useEffect", "useCallback", "useMemo", "useRef"];

const PRIMITIVES: &[&str] = &[
    "Card", "CardContent", "CardDescription", "CardFooter", "CardHeader", "CardTitle",
    "Button", "Input", "Tabs", "TabsContent", "TabsList", "TabsTrigger", "Progress", "Badge",
    "Alert", "AlertDescription", "AlertTitle", "Select", "SelectContent", "SelectItem",
    "SelectTrigger", "SelectValue", "Checkbox", "Switch", "Label", "Textarea", "Dialog",
    "DialogContent", "DialogDescription", "DialogFooter", "DialogHeader", "DialogTitle",
    "DialogTrigger", "Table", "TableBody", "TableCell", "TableHead", "TableHeader", "TableRow",
    "ScrollArea", "Avatar", "AvatarFallback", "AvatarImage", "Accordion", "AccordionContent",
    "AccordionItem", "AccordionTrigger",
];

const ICONS: &[&str] = &[
    "Activity", "AlertCircle", "AlertTriangle", "ArrowRight", "Bell", "Calendar", "Check",
    "CheckCircle", "ChevronDown", "ChevronRight", "Clock", "Download", "Edit", "Eye", "Heart",
    "Home", "Info", "Loader2", "Lock", "Mail", "Menu", "Minus", "Pause", "Play", "Plus",
    "RefreshCw", "Search", "Settings", "Star", "Trash2", "Upload", "User", "X", "Zap",
];

impl Scope {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Runtime, hooks, component-library primitives and icons generated
    /// components are written against.
    pub fn default_ui() -> Self {
        let mut scope = Self::empty().with("React", Capability::Runtime);
        for hook in HOOKS {
            scope = scope.with(*hook, Capability::Hook);
        }
        for primitive in PRIMITIVES {
            scope = scope.with(*primitive, Capability::Primitive);
        }
        for icon in ICONS {
            scope = scope.with(*icon, Capability::Icon);
        }
        scope
    }

    /// Add an entry, replacing the capability of an existing key in place.
    pub fn with(mut self, key: impl Into<String>, capability: Capability) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = capability,
            None => self.entries.push((key, capability)),
        }
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Entries in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Capability)> + '_ {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn get(&self, key: &str) -> Option<Capability> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::default_ui()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scope_order_starts_with_runtime() {
        let scope = Scope::default_ui();
        let keys = scope.keys();
        assert_eq!(keys[0], "React");
        assert_eq!(keys[1], "useState");
        assert_eq!(scope.get("Card"), Some(Capability::Primitive));
        assert_eq!(scope.get("Zap"), Some(Capability::Icon));
    }

    #[test]
    fn test_with_replaces_without_reordering() {
        let scope = Scope::empty()
            .with("a", Capability::Hook)
            .with("b", Capability::Icon)
            .with("a", Capability::Primitive);
        assert_eq!(scope.keys(), vec!["a", "b"]);
        assert_eq!(scope.get("a"), Some(Capability::Primitive));
    }
}
