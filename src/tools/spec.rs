//! Static description of every tool: name, description and argument properties.
//!
//! The table drives argument validation, MCP schemas and the HTTP catalogue alike.

/// Argument property accepted by a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolProperty {
    /// Field name inside `arguments`.
    pub name: &'static str,
    /// JSON type advertised to clients.
    pub property_type: &'static str,
    /// Description shown to clients.
    pub description: &'static str,
    /// Wording used in `No <label> provided`.
    pub label: &'static str,
    /// Whether the handler rejects calls without this field.
    pub required: bool,
}

/// Static metadata for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    /// Name the tool is invoked by.
    pub name: &'static str,
    /// Human title.
    pub title: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Argument properties in validation order.
    pub properties: &'static [ToolProperty],
    /// Whether the tool only reads state.
    pub read_only: bool,
    /// Whether the tool reaches a third-party service.
    pub open_world: bool,
}

impl ToolSpec {
    /// Properties the handler validates, in declared order.
    pub fn required_properties(&self) -> impl Iterator<Item = &ToolProperty> {
        self.properties.iter().filter(|property| property.required)
    }
}

/// Argument carrying the snippet name; also resolves the blob key.
pub const SNIPPET_NAME_PROPERTY: &str = "snippetname";
/// Argument carrying the snippet content.
pub const SNIPPET_PROPERTY: &str = "snippet";
/// Argument carrying the IP address for AbuseIPDB tools.
pub const IP_PROPERTY: &str = "ip";
/// Argument carrying comma-separated AbuseIPDB category ids.
pub const CATEGORIES_PROPERTY: &str = "categories";
/// Argument carrying the AbuseIPDB report comment.
pub const COMMENT_PROPERTY: &str = "comment";

/// `hello_mcp`: greeting with no arguments.
pub const HELLO_MCP: ToolSpec = ToolSpec {
    name: "hello_mcp",
    title: "Hello",
    description: "Hello world.",
    properties: &[],
    read_only: true,
    open_world: false,
};

/// `get_snippet`: read a stored snippet by name.
pub const GET_SNIPPET: ToolSpec = ToolSpec {
    name: "get_snippet",
    title: "Get Snippet",
    description: "Retrieve a snippet by name.",
    // Resolved by the storage binding, not validated by the handler.
    properties: &[ToolProperty {
        name: SNIPPET_NAME_PROPERTY,
        property_type: "string",
        description: "The name of the snippet.",
        label: "snippet name",
        required: false,
    }],
    read_only: true,
    open_world: false,
};

/// `save_snippet`: store a snippet under a name.
pub const SAVE_SNIPPET: ToolSpec = ToolSpec {
    name: "save_snippet",
    title: "Save Snippet",
    description: "Save a snippet with a name.",
    properties: &[
        ToolProperty {
            name: SNIPPET_NAME_PROPERTY,
            property_type: "string",
            description: "The name of the snippet.",
            label: "snippet name",
            required: true,
        },
        ToolProperty {
            name: SNIPPET_PROPERTY,
            property_type: "string",
            description: "The content of the snippet.",
            label: "snippet content",
            required: true,
        },
    ],
    read_only: false,
    open_world: false,
};

/// `abuseipdb_check_ip`: reputation lookup for an address.
pub const ABUSEIPDB_CHECK_IP: ToolSpec = ToolSpec {
    name: "abuseipdb_check_ip",
    title: "Check IP Reputation",
    description: "Check an IP reputation via AbuseIPDB.",
    properties: &[ToolProperty {
        name: IP_PROPERTY,
        property_type: "string",
        description: "IPv4 or IPv6 address to check.",
        label: "ip",
        required: true,
    }],
    read_only: true,
    open_world: true,
};

/// `abuseipdb_report_ip`: file an abuse report for an address.
pub const ABUSEIPDB_REPORT_IP: ToolSpec = ToolSpec {
    name: "abuseipdb_report_ip",
    title: "Report IP",
    description: "Report an IP to AbuseIPDB.",
    properties: &[
        ToolProperty {
            name: IP_PROPERTY,
            property_type: "string",
            description: "IPv4 or IPv6 address to report.",
            label: "ip",
            required: true,
        },
        ToolProperty {
            name: CATEGORIES_PROPERTY,
            property_type: "string",
            description: "Comma-separated AbuseIPDB category ids, e.g. \"14,18\".",
            label: "categories",
            required: true,
        },
        ToolProperty {
            name: COMMENT_PROPERTY,
            property_type: "string",
            description: "Free-text description of the observed abuse.",
            label: "comment",
            required: true,
        },
    ],
    read_only: false,
    open_world: true,
};

/// Every tool served, in catalogue order.
pub static TOOLS: [ToolSpec; 5] = [
    HELLO_MCP,
    GET_SNIPPET,
    SAVE_SNIPPET,
    ABUSEIPDB_CHECK_IP,
    ABUSEIPDB_REPORT_IP,
];

/// Look up a tool by name.
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|spec| spec.name == name)
}
