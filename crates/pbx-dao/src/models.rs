//! Typed rows of the PBX configuration schema and their derived views.
//!
//! Every struct maps one table 1:1. Values cached from other tables (a line's
//! `name`, a queue member's `interface`, ...) are plain columns here; the
//! `fixes` module is what keeps them in step.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::store::record::impl_record;

// ---------------------------------------------------------------------------
// Protocol discriminators
// ---------------------------------------------------------------------------

pub const PROTOCOL_SIP: &str = "sip";
pub const PROTOCOL_SCCP: &str = "sccp";
pub const PROTOCOL_CUSTOM: &str = "custom";
pub const PROTOCOL_IAX: &str = "iax";

/// The endpoint a line points at through `(protocol, protocolid)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointRef {
    Sip(i64),
    Sccp(i64),
    Custom(i64),
}

impl EndpointRef {
    /// `None` when either column is unset or the protocol is unknown.
    pub fn from_columns(protocol: Option<&str>, protocolid: Option<i64>) -> Option<Self> {
        match (protocol?, protocolid?) {
            (PROTOCOL_SIP, id) => Some(EndpointRef::Sip(id)),
            (PROTOCOL_SCCP, id) => Some(EndpointRef::Sccp(id)),
            (PROTOCOL_CUSTOM, id) => Some(EndpointRef::Custom(id)),
            _ => None,
        }
    }

    pub fn to_columns(self) -> (&'static str, i64) {
        match self {
            EndpointRef::Sip(id) => (PROTOCOL_SIP, id),
            EndpointRef::Sccp(id) => (PROTOCOL_SCCP, id),
            EndpointRef::Custom(id) => (PROTOCOL_CUSTOM, id),
        }
    }

    pub fn id(self) -> i64 {
        self.to_columns().1
    }
}

/// The endpoint a trunk points at through `(protocol, protocolid)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrunkEndpointRef {
    Sip(i64),
    Iax(i64),
    Custom(i64),
}

impl TrunkEndpointRef {
    pub fn from_columns(protocol: Option<&str>, protocolid: Option<i64>) -> Option<Self> {
        match (protocol?, protocolid?) {
            (PROTOCOL_SIP, id) => Some(TrunkEndpointRef::Sip(id)),
            (PROTOCOL_IAX, id) => Some(TrunkEndpointRef::Iax(id)),
            (PROTOCOL_CUSTOM, id) => Some(TrunkEndpointRef::Custom(id)),
            _ => None,
        }
    }

    pub fn to_columns(self) -> (&'static str, i64) {
        match self {
            TrunkEndpointRef::Sip(id) => (PROTOCOL_SIP, id),
            TrunkEndpointRef::Iax(id) => (PROTOCOL_IAX, id),
            TrunkEndpointRef::Custom(id) => (PROTOCOL_CUSTOM, id),
        }
    }
}

/// Which register table a trunk's `registerid` points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterKind {
    Sip,
    Iax,
}

impl RegisterKind {
    pub fn protocol(self) -> &'static str {
        match self {
            RegisterKind::Sip => PROTOCOL_SIP,
            RegisterKind::Iax => PROTOCOL_IAX,
        }
    }
}

/// Outcome of following a discriminator pair.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution<E> {
    /// Both columns are NULL.
    Unbound,
    Resolved(E),
    /// The columns are set but point at nothing usable.
    Dangling,
}

impl<E> Resolution<E> {
    pub fn resolved(&self) -> Option<&E> {
        match self {
            Resolution::Resolved(e) => Some(e),
            _ => None,
        }
    }
}

/// A line endpoint loaded from its table.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedEndpoint {
    Sip(SipEndpoint),
    Sccp(SccpEndpoint),
    Custom(CustomEndpoint),
}

impl ResolvedEndpoint {
    /// Name cached on the line: the SIP or SCCP name, the custom interface.
    pub fn line_name(&self) -> String {
        match self {
            ResolvedEndpoint::Sip(sip) => sip.name.clone(),
            ResolvedEndpoint::Sccp(sccp) => sccp.name.clone(),
            ResolvedEndpoint::Custom(custom) => custom.interface.clone(),
        }
    }

    /// Queue-member channel for this technology.
    pub fn channel(&self) -> &'static str {
        match self {
            ResolvedEndpoint::Sip(_) => "SIP",
            ResolvedEndpoint::Sccp(_) => "SCCP",
            ResolvedEndpoint::Custom(_) => "**Unknown**",
        }
    }

    /// Dial interface, `None` for a custom endpoint with an empty interface.
    pub fn interface(&self) -> Option<String> {
        match self {
            ResolvedEndpoint::Sip(sip) => Some(format!("SIP/{}", sip.name)),
            ResolvedEndpoint::Sccp(sccp) => Some(format!("SCCP/{}", sccp.name)),
            ResolvedEndpoint::Custom(custom) if custom.interface.is_empty() => None,
            ResolvedEndpoint::Custom(custom) => Some(custom.interface.clone()),
        }
    }
}

/// A trunk endpoint loaded from its table.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedTrunkEndpoint {
    Sip(SipEndpoint),
    Iax(IaxEndpoint),
    Custom(CustomEndpoint),
}

// ---------------------------------------------------------------------------
// Caller id
// ---------------------------------------------------------------------------

static CALLER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?P<name>[^"]*)"(?:\s*<(?P<number>[^>]*)>)?$"#).unwrap());

/// Parsed `"Name" <Number>` caller id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerId {
    pub name: String,
    pub number: Option<String>,
}

impl CallerId {
    /// Parse `"Name" <Number>` or `"Name"`. Unquoted text is taken as the
    /// whole name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match CALLER_ID_RE.captures(raw) {
            Some(caps) => Some(CallerId {
                name: caps["name"].to_string(),
                number: caps
                    .name("number")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|n| !n.is_empty()),
            }),
            None => Some(CallerId {
                name: raw.to_string(),
                number: None,
            }),
        }
    }

    /// Quotes inside the name are dropped.
    pub fn format(&self) -> String {
        let name = self.name.replace('"', "");
        match &self.number {
            Some(number) => format!("\"{name}\" <{number}>"),
            None => format!("\"{name}\""),
        }
    }
}

/// Optional caller name stored as `callerdisplay`, where `''` means none.
pub fn callerdisplay_to_name(callerdisplay: &str) -> Option<String> {
    if callerdisplay.is_empty() {
        None
    } else {
        Some(callerdisplay.to_string())
    }
}

pub fn name_to_callerdisplay(name: Option<&str>) -> String {
    name.unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// commented <-> enabled
// ---------------------------------------------------------------------------

pub fn enabled_from_commented(commented: i64) -> bool {
    commented == 0
}

pub fn commented_from_enabled(enabled: bool) -> i64 {
    if enabled {
        0
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// 1. Line
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Line {
    pub id: i64,
    pub protocol: Option<String>,
    pub protocolid: Option<i64>,
    pub name: Option<String>,
    pub number: Option<String>,
    pub context: Option<String>,
    pub provisioningid: i64,
    pub position: i64,
    pub description: Option<String>,
    pub commented: i64,
}

impl_record!(Line, "Line", "linefeatures", {
    id => "id",
    protocol => "protocol",
    protocolid => "protocolid",
    name => "name",
    number => "number",
    context => "context",
    provisioningid => "provisioningid",
    position => "position",
    description => "description",
    commented => "commented",
}
const RELATIONS: &'static [(&'static str, &'static str)] = &[(
    "user_id",
    "id IN (SELECT line_id FROM user_line WHERE user_id = ?)",
)];);

impl Line {
    pub fn new(context: &str) -> Self {
        Line {
            context: Some(context.to_string()),
            position: 1,
            ..Default::default()
        }
    }

    pub fn endpoint(&self) -> Option<EndpointRef> {
        EndpointRef::from_columns(self.protocol.as_deref(), self.protocolid)
    }

    /// Whether either discriminator column is set.
    pub fn has_discriminator(&self) -> bool {
        self.protocol.is_some() || self.protocolid.is_some()
    }

    pub fn set_endpoint(&mut self, endpoint: Option<EndpointRef>) {
        match endpoint {
            Some(e) => {
                let (protocol, id) = e.to_columns();
                self.protocol = Some(protocol.to_string());
                self.protocolid = Some(id);
            }
            None => {
                self.protocol = None;
                self.protocolid = None;
            }
        }
    }

    pub fn enabled(&self) -> bool {
        enabled_from_commented(self.commented)
    }
}

// ---------------------------------------------------------------------------
// 2. Extension / LineExtension
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Extension {
    pub id: i64,
    pub commented: i64,
    pub context: String,
    pub exten: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub typeval: String,
}

impl_record!(Extension, "Extension", "extensions", {
    id => "id",
    commented => "commented",
    context => "context",
    exten => "exten",
    kind => "type",
    typeval => "typeval",
});

impl Extension {
    pub fn new(exten: &str, context: &str) -> Self {
        Extension {
            exten: exten.to_string(),
            context: context.to_string(),
            kind: "user".to_string(),
            typeval: "0".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LineExtension {
    pub line_id: i64,
    pub extension_id: i64,
    pub main_extension: bool,
}

impl_record!(LineExtension, "LineExtension", "line_extension", {
    line_id => "line_id",
    extension_id => "extension_id",
    main_extension => "main_extension",
}
const PRIMARY_KEY: &'static [&'static str] = &["line_id", "extension_id"];
const AUTO_ID: bool = false;);

// ---------------------------------------------------------------------------
// 3. User / UserLine
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub callerid: Option<String>,
    pub outcallerid: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub commented: i64,
}

impl_record!(User, "User", "userfeatures", {
    id => "id",
    firstname => "firstname",
    lastname => "lastname",
    callerid => "callerid",
    outcallerid => "outcallerid",
    email => "email",
    description => "description",
    commented => "commented",
}
const RELATIONS: &'static [(&'static str, &'static str)] = &[(
    "line_id",
    "id IN (SELECT user_id FROM user_line WHERE line_id = ?)",
)];);

impl User {
    pub fn fullname(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserLine {
    pub user_id: i64,
    pub line_id: i64,
    pub main_user: bool,
    pub main_line: bool,
}

impl_record!(UserLine, "UserLine", "user_line", {
    user_id => "user_id",
    line_id => "line_id",
    main_user => "main_user",
    main_line => "main_line",
}
const PRIMARY_KEY: &'static [&'static str] = &["user_id", "line_id"];
const AUTO_ID: bool = false;);

// ---------------------------------------------------------------------------
// 4. Endpoints
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SipEndpoint {
    pub id: i64,
    pub name: String,
    pub context: Option<String>,
    pub callerid: Option<String>,
    pub secret: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub host: String,
    pub category: String,
    pub commented: i64,
}

impl_record!(SipEndpoint, "SIPEndpoint", "usersip", {
    id => "id",
    name => "name",
    context => "context",
    callerid => "callerid",
    secret => "secret",
    kind => "type",
    host => "host",
    category => "category",
    commented => "commented",
});

impl SipEndpoint {
    pub fn new(name: &str) -> Self {
        SipEndpoint {
            name: name.to_string(),
            kind: "friend".to_string(),
            host: "dynamic".to_string(),
            category: "user".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SccpEndpoint {
    pub id: i64,
    pub name: String,
    pub cid_name: String,
    pub cid_num: String,
    pub commented: i64,
}

impl_record!(SccpEndpoint, "SCCPEndpoint", "sccpline", {
    id => "id",
    name => "name",
    cid_name => "cid_name",
    cid_num => "cid_num",
    commented => "commented",
});

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CustomEndpoint {
    pub id: i64,
    pub name: Option<String>,
    pub context: Option<String>,
    pub interface: String,
    pub category: String,
    pub commented: i64,
}

impl_record!(CustomEndpoint, "CustomEndpoint", "usercustom", {
    id => "id",
    name => "name",
    context => "context",
    interface => "interface",
    category => "category",
    commented => "commented",
});

impl CustomEndpoint {
    pub fn new(interface: &str) -> Self {
        CustomEndpoint {
            interface: interface.to_string(),
            category: "user".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IaxEndpoint {
    pub id: i64,
    pub name: String,
    pub context: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub host: String,
    pub category: String,
    pub commented: i64,
}

impl_record!(IaxEndpoint, "IAXEndpoint", "useriax", {
    id => "id",
    name => "name",
    context => "context",
    kind => "type",
    host => "host",
    category => "category",
    commented => "commented",
});

impl IaxEndpoint {
    pub fn new(name: &str) -> Self {
        IaxEndpoint {
            name: name.to_string(),
            kind: "friend".to_string(),
            host: "dynamic".to_string(),
            category: "trunk".to_string(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Trunk / registers
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Trunk {
    pub id: i64,
    pub protocol: Option<String>,
    pub protocolid: Option<i64>,
    pub registerid: i64,
    pub registercommented: i64,
    pub description: Option<String>,
    pub context: Option<String>,
}

impl_record!(Trunk, "Trunk", "trunkfeatures", {
    id => "id",
    protocol => "protocol",
    protocolid => "protocolid",
    registerid => "registerid",
    registercommented => "registercommented",
    description => "description",
    context => "context",
});

impl Trunk {
    pub fn endpoint(&self) -> Option<TrunkEndpointRef> {
        TrunkEndpointRef::from_columns(self.protocol.as_deref(), self.protocolid)
    }

    pub fn has_discriminator(&self) -> bool {
        self.protocol.is_some() || self.protocolid.is_some()
    }

    pub fn set_endpoint(&mut self, endpoint: Option<TrunkEndpointRef>) {
        match endpoint {
            Some(e) => {
                let (protocol, id) = e.to_columns();
                self.protocol = Some(protocol.to_string());
                self.protocolid = Some(id);
            }
            None => {
                self.protocol = None;
                self.protocolid = None;
            }
        }
    }

    /// Register table `registerid` refers to, from the protocol.
    pub fn register_kind(&self) -> Option<RegisterKind> {
        match self.protocol.as_deref() {
            Some(PROTOCOL_SIP) => Some(RegisterKind::Sip),
            Some(PROTOCOL_IAX) => Some(RegisterKind::Iax),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RegisterSip {
    pub id: i64,
    pub var_val: String,
    pub commented: i64,
}

impl_record!(RegisterSip, "RegisterSIP", "register_sip", {
    id => "id",
    var_val => "var_val",
    commented => "commented",
});

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RegisterIax {
    pub id: i64,
    pub var_val: String,
    pub commented: i64,
}

impl_record!(RegisterIax, "RegisterIAX", "register_iax", {
    id => "id",
    var_val => "var_val",
    commented => "commented",
});

// ---------------------------------------------------------------------------
// 6. Agents / queues
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Agent {
    pub id: i64,
    pub number: String,
    pub firstname: String,
    pub lastname: String,
    pub description: Option<String>,
}

impl_record!(Agent, "Agent", "agentfeatures", {
    id => "id",
    number => "number",
    firstname => "firstname",
    lastname => "lastname",
    description => "description",
});

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Queue {
    pub id: i64,
    pub name: String,
    pub displayname: String,
    pub number: Option<String>,
    pub context: Option<String>,
    pub timeout: Option<i64>,
    pub commented: i64,
}

impl_record!(Queue, "Queue", "queuefeatures", {
    id => "id",
    name => "name",
    displayname => "displayname",
    number => "number",
    context => "context",
    timeout => "timeout",
    commented => "commented",
});

impl Queue {
    pub fn enabled(&self) -> bool {
        enabled_from_commented(self.commented)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.commented = commented_from_enabled(enabled);
    }
}

pub const MEMBER_USER: &str = "user";
pub const MEMBER_AGENT: &str = "agent";
pub const CATEGORY_QUEUE: &str = "queue";
pub const CATEGORY_GROUP: &str = "group";
pub const CHANNEL_LOCAL: &str = "Local";
pub const CHANNEL_AGENT: &str = "Agent";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueueMember {
    pub id: i64,
    pub queue_name: String,
    pub interface: String,
    pub penalty: i64,
    pub commented: i64,
    pub usertype: String,
    pub userid: i64,
    pub channel: String,
    pub category: String,
    pub position: i64,
}

impl_record!(QueueMember, "QueueMember", "queuemember", {
    id => "id",
    queue_name => "queue_name",
    interface => "interface",
    penalty => "penalty",
    commented => "commented",
    usertype => "usertype",
    userid => "userid",
    channel => "channel",
    category => "category",
    position => "position",
});

impl QueueMember {
    pub fn is_user(&self) -> bool {
        self.usertype == MEMBER_USER
    }

    pub fn is_local(&self) -> bool {
        self.channel == CHANNEL_LOCAL
    }
}

// ---------------------------------------------------------------------------
// 7. Schedule
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Schedule {
    pub id: i64,
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub fallback_action: String,
    pub fallback_actionid: Option<String>,
    pub fallback_actionargs: Option<String>,
    pub description: Option<String>,
    pub commented: i64,
}

impl_record!(Schedule, "Schedule", "schedule", {
    id => "id",
    name => "name",
    timezone => "timezone",
    fallback_action => "fallback_action",
    fallback_actionid => "fallback_actionid",
    fallback_actionargs => "fallback_actionargs",
    description => "description",
    commented => "commented",
});

/// Split `type:subtype`. Only the first `:` separates.
pub fn split_action(action: &str) -> (Option<String>, Option<String>) {
    if action.is_empty() {
        return (None, None);
    }
    match action.split_once(':') {
        Some((kind, subtype)) => (Some(kind.to_string()), Some(subtype.to_string())),
        None => (Some(action.to_string()), None),
    }
}

/// Inverse of [`split_action`]; an empty subtype drops the separator.
pub fn join_action(kind: Option<&str>, subtype: Option<&str>) -> String {
    let kind = kind.unwrap_or_default();
    match subtype.filter(|s| !s.is_empty()) {
        Some(subtype) => format!("{kind}:{subtype}"),
        None => kind.to_string(),
    }
}

impl Schedule {
    pub fn action_type(&self) -> Option<String> {
        split_action(&self.fallback_action).0
    }

    pub fn action_subtype(&self) -> Option<String> {
        split_action(&self.fallback_action).1
    }

    pub fn set_action_type(&mut self, kind: Option<&str>) {
        let subtype = self.action_subtype();
        self.fallback_action = join_action(kind, subtype.as_deref());
    }

    pub fn set_action_subtype(&mut self, subtype: Option<&str>) {
        let kind = self.action_type();
        self.fallback_action = join_action(kind.as_deref(), subtype);
    }

    pub fn enabled(&self) -> bool {
        enabled_from_commented(self.commented)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.commented = commented_from_enabled(enabled);
    }
}

// ---------------------------------------------------------------------------
// 8. Simple feature tables
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Moh {
    pub id: i64,
    pub name: String,
    pub label: Option<String>,
    pub mode: String,
    pub application: Option<String>,
    pub sort: Option<String>,
}

impl_record!(Moh, "MOH", "moh", {
    id => "id",
    name => "name",
    label => "label",
    mode => "mode",
    application => "application",
    sort => "sort",
});

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Paging {
    pub id: i64,
    pub number: Option<String>,
    pub name: Option<String>,
    pub announce_sound: Option<String>,
    pub commented: i64,
}

impl_record!(Paging, "Paging", "paging", {
    id => "id",
    number => "number",
    name => "name",
    announce_sound => "announce_sound",
    commented => "commented",
});

impl Paging {
    pub fn enabled(&self) -> bool {
        enabled_from_commented(self.commented)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AccessFeature {
    pub id: i64,
    pub host: String,
    pub feature: String,
    pub commented: i64,
}

impl_record!(AccessFeature, "AccessFeature", "accessfeatures", {
    id => "id",
    host => "host",
    feature => "feature",
    commented => "commented",
});

impl AccessFeature {
    pub fn enabled(&self) -> bool {
        enabled_from_commented(self.commented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ref_columns() {
        assert_eq!(
            EndpointRef::from_columns(Some("sip"), Some(3)),
            Some(EndpointRef::Sip(3))
        );
        assert_eq!(EndpointRef::from_columns(Some("iax"), Some(3)), None);
        assert_eq!(EndpointRef::from_columns(Some("sccp"), None), None);
        assert_eq!(EndpointRef::Custom(9).to_columns(), ("custom", 9));
        assert_eq!(
            TrunkEndpointRef::from_columns(Some("iax"), Some(4)),
            Some(TrunkEndpointRef::Iax(4))
        );
    }

    #[test]
    fn test_line_discriminator_helpers() {
        let mut line = Line::new("default");
        assert!(!line.has_discriminator());
        line.set_endpoint(Some(EndpointRef::Sccp(2)));
        assert_eq!(line.protocol.as_deref(), Some("sccp"));
        assert_eq!(line.endpoint(), Some(EndpointRef::Sccp(2)));
        line.protocol = Some("bogus".into());
        assert!(line.has_discriminator());
        assert_eq!(line.endpoint(), None);
    }

    #[test]
    fn test_caller_id_parse_and_format() {
        let full = CallerId::parse("\"Jôhn Smith\" <1000>").unwrap();
        assert_eq!(full.name, "Jôhn Smith");
        assert_eq!(full.number.as_deref(), Some("1000"));
        assert_eq!(full.format(), "\"Jôhn Smith\" <1000>");

        let name_only = CallerId::parse("\"Jôhn Smith\"").unwrap();
        assert_eq!(name_only.number, None);
        assert_eq!(name_only.format(), "\"Jôhn Smith\"");

        let bare = CallerId::parse("Jôhn").unwrap();
        assert_eq!(bare.name, "Jôhn");
        assert_eq!(CallerId::parse("   "), None);
    }

    #[test]
    fn test_caller_id_format_drops_embedded_quotes() {
        let quoted = CallerId::parse("Jo \"Bo\" Smith").unwrap();
        assert_eq!(quoted.name, "Jo \"Bo\" Smith");
        assert_eq!(quoted.format(), "\"Jo Bo Smith\"");

        let reparsed = CallerId::parse(&quoted.format()).unwrap();
        assert_eq!(reparsed.name, "Jo Bo Smith");
    }

    #[test]
    fn test_callerdisplay_conversion() {
        assert_eq!(callerdisplay_to_name(""), None);
        assert_eq!(callerdisplay_to_name("Sales").as_deref(), Some("Sales"));
        assert_eq!(name_to_callerdisplay(None), "");
    }

    #[test]
    fn test_schedule_action_split() {
        let mut schedule = Schedule {
            fallback_action: "voicemenu".into(),
            ..Default::default()
        };
        assert_eq!(schedule.action_type().as_deref(), Some("voicemenu"));
        assert_eq!(schedule.action_subtype(), None);

        schedule.set_action_type(Some("application"));
        schedule.set_action_subtype(Some("disa"));
        assert_eq!(schedule.fallback_action, "application:disa");

        schedule.fallback_action = "a:b:c".into();
        assert_eq!(split_action(&schedule.fallback_action).1.as_deref(), Some("b:c"));

        schedule.set_action_subtype(None);
        assert_eq!(schedule.fallback_action, "a");
    }

    #[test]
    fn test_enabled_follows_commented() {
        let mut queue = Queue::default();
        assert!(queue.enabled());
        queue.set_enabled(false);
        assert_eq!(queue.commented, 1);
    }

    #[test]
    fn test_resolved_endpoint_views() {
        let sip = ResolvedEndpoint::Sip(SipEndpoint::new("abcdef"));
        assert_eq!(sip.interface().as_deref(), Some("SIP/abcdef"));
        assert_eq!(sip.channel(), "SIP");

        let custom = ResolvedEndpoint::Custom(CustomEndpoint::new(""));
        assert_eq!(custom.interface(), None);
        assert_eq!(custom.channel(), "**Unknown**");
    }
}
