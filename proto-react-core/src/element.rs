//! Virtual elements
//!
//! An [`Element`] is an immutable description of UI: a kind, its props and
//! its children. Elements are reference counted so re-rendering an unchanged
//! subtree is a pointer copy.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::error::{ReactError, Result};
use crate::props::{is_event, PropValue, Props};
use crate::scope::RenderScope;

/// Signature of a component render function.
pub type RenderFn = dyn Fn(&mut RenderScope<'_>, &Props) -> Result<Element>;

/// A function component.
///
/// Two components are the same type only if they share the same render
/// function allocation; cloning a `Component` keeps its identity.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    /// Create a component from a render function.
    pub fn new<F>(name: &str, render: F) -> Self
    where
        F: Fn(&mut RenderScope<'_>, &Props) -> Result<Element> + 'static,
    {
        Self {
            name: Rc::from(name),
            render: Rc::new(render),
        }
    }

    /// Component name, used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the render function.
    pub fn render(&self, scope: &mut RenderScope<'_>, props: &Props) -> Result<Element> {
        (self.render)(scope, props)
    }

    /// Function identity.
    pub fn same(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// Element kind.
#[derive(Clone, Debug)]
pub enum ElementKind {
    /// Text node with its content.
    Text(String),
    /// Host element with its tag name.
    Host(String),
    /// Function component.
    Component(Component),
    /// Render root; its DOM node is the container.
    Root,
}

impl ElementKind {
    /// Short tag used in logs.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Host(_) => "node",
            ElementKind::Component(_) => "component",
            ElementKind::Root => "root",
        }
    }

    /// Type equality: same tag and same value. Text compares content, hosts
    /// compare tag names and components compare function identity.
    pub fn same_type(&self, other: &ElementKind) -> bool {
        match (self, other) {
            (ElementKind::Text(a), ElementKind::Text(b)) => a == b,
            (ElementKind::Host(a), ElementKind::Host(b)) => a == b,
            (ElementKind::Component(a), ElementKind::Component(b)) => a.same(b),
            (ElementKind::Root, ElementKind::Root) => true,
            _ => false,
        }
    }

    /// Check if this kind owns a DOM node of its own.
    pub fn is_host(&self) -> bool {
        matches!(self, ElementKind::Text(_) | ElementKind::Host(_))
    }

    /// Check if this kind is a function component.
    pub fn is_component(&self) -> bool {
        matches!(self, ElementKind::Component(_))
    }

    /// Readable name: tag name, component name, `#text` or `#root`.
    pub fn display_name(&self) -> &str {
        match self {
            ElementKind::Text(_) => "#text",
            ElementKind::Host(tag) => tag,
            ElementKind::Component(c) => c.name(),
            ElementKind::Root => "#root",
        }
    }
}

/// Conversion into an element kind, used by [`h!`](crate::h).
pub trait IntoKind {
    fn into_kind(self) -> ElementKind;
}

impl IntoKind for &str {
    fn into_kind(self) -> ElementKind {
        ElementKind::Host(self.into())
    }
}

impl IntoKind for String {
    fn into_kind(self) -> ElementKind {
        ElementKind::Host(self)
    }
}

impl IntoKind for Component {
    fn into_kind(self) -> ElementKind {
        ElementKind::Component(self)
    }
}

impl IntoKind for &Component {
    fn into_kind(self) -> ElementKind {
        ElementKind::Component(self.clone())
    }
}

impl IntoKind for ElementKind {
    fn into_kind(self) -> ElementKind {
        self
    }
}

struct ElementData {
    kind: ElementKind,
    props: Props,
    children: Vec<Element>,
}

/// Immutable virtual element.
#[derive(Clone)]
pub struct Element(Rc<ElementData>);

impl Element {
    fn from_parts(kind: ElementKind, props: Props, children: Vec<Element>) -> Self {
        Element(Rc::new(ElementData {
            kind,
            props,
            children,
        }))
    }

    /// Create a text element.
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self::from_parts(ElementKind::Text(content.into()), Props::new(), Vec::new())
    }

    /// Create a childless host element without props.
    pub fn host(tag: &str) -> Result<Self> {
        create_element(ElementKind::Host(tag.into()), Props::new(), Vec::new())
    }

    /// Create a component element.
    pub fn component(component: &Component, props: Props) -> Result<Self> {
        create_element(ElementKind::Component(component.clone()), props, Vec::new())
    }

    /// Wrap an element as the single child of a render root.
    pub(crate) fn root(child: Element) -> Self {
        Self::from_parts(ElementKind::Root, Props::new(), alloc::vec![child])
    }

    /// Element kind.
    pub fn kind(&self) -> &ElementKind {
        &self.0.kind
    }

    /// Element props.
    pub fn props(&self) -> &Props {
        &self.0.props
    }

    /// Child elements.
    pub fn children(&self) -> &[Element] {
        &self.0.children
    }

    /// Type equality, see [`ElementKind::same_type`].
    pub fn same_type(&self, other: &Element) -> bool {
        self.kind().same_type(other.kind())
    }

    /// Check if both handles point at the same element.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Text content of a text element.
    pub fn text_content(&self) -> Option<&str> {
        match self.kind() {
            ElementKind::Text(content) => Some(content),
            _ => None,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ElementKind::Text(content) => write!(f, "{:?}", content),
            kind => {
                let mut s = f.debug_struct(kind.display_name());
                if !self.props().is_empty() {
                    s.field("props", self.props());
                }
                if !self.children().is_empty() {
                    s.field("children", &self.children());
                }
                s.finish()
            }
        }
    }
}

/// A child passed to [`create_element`].
///
/// Lists are flattened, `Bool` and `Null` render nothing, strings and
/// numbers become text elements. `Failed` carries an error from a nested
/// builder call so it surfaces from the outer one.
pub enum Child {
    Element(Element),
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<Child>),
    Failed(ReactError),
}

impl From<Element> for Child {
    fn from(e: Element) -> Self {
        Child::Element(e)
    }
}

impl From<Result<Element>> for Child {
    fn from(r: Result<Element>) -> Self {
        match r {
            Ok(e) => Child::Element(e),
            Err(e) => Child::Failed(e),
        }
    }
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Child::Text(s.into())
    }
}

impl From<String> for Child {
    fn from(s: String) -> Self {
        Child::Text(s)
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Child::Int(n as i64)
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Child::Int(n)
    }
}

impl From<usize> for Child {
    fn from(n: usize) -> Self {
        Child::Int(n as i64)
    }
}

impl From<f64> for Child {
    fn from(x: f64) -> Self {
        Child::Float(x)
    }
}

impl From<bool> for Child {
    fn from(b: bool) -> Self {
        Child::Bool(b)
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Child::Null,
        }
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Child::List(items.into_iter().map(Into::into).collect())
    }
}

/// Collect a fixed list of children, used by [`h!`](crate::h).
pub fn children<const N: usize>(items: [Child; N]) -> Vec<Child> {
    items.into_iter().collect()
}

/// Build an element.
///
/// Text and root elements are produced by the library itself, so passing
/// those kinds here is an error. Event props must hold handlers and
/// handlers may only sit on event props.
pub fn create_element(kind: ElementKind, props: Props, children: Vec<Child>) -> Result<Element> {
    match &kind {
        ElementKind::Host(tag) => validate_tag(tag)?,
        ElementKind::Component(_) => {}
        ElementKind::Text(_) => {
            return Err(ReactError::shape(
                "text elements are created from string children",
            ))
        }
        ElementKind::Root => {
            return Err(ReactError::shape("root elements are created by render"))
        }
    }

    for (key, value) in props.iter() {
        validate_prop(key, value)?;
    }

    let mut flat = Vec::with_capacity(children.len());
    flatten_children(children, &mut flat)?;

    Ok(Element::from_parts(kind, props, flat))
}

fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(ReactError::shape("empty tag name"));
    }
    if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ReactError::shape(format!("invalid tag name {:?}", tag)));
    }
    Ok(())
}

fn validate_prop(key: &str, value: &PropValue) -> Result<()> {
    if key.is_empty() {
        return Err(ReactError::shape("empty prop name"));
    }
    if key == "children" {
        return Err(ReactError::shape(
            "children are passed as arguments, not as a prop",
        ));
    }
    if is_event(key) {
        if key.len() == 2 {
            return Err(ReactError::UnsupportedPropType {
                key: key.to_string(),
                reason: "names no event",
            });
        }
        if !value.is_handler() {
            return Err(ReactError::UnsupportedPropType {
                key: key.to_string(),
                reason: "expects an event handler",
            });
        }
    } else if value.is_handler() {
        return Err(ReactError::UnsupportedPropType {
            key: key.to_string(),
            reason: "cannot hold an event handler",
        });
    }
    Ok(())
}

fn flatten_children(children: Vec<Child>, out: &mut Vec<Element>) -> Result<()> {
    for child in children {
        match child {
            Child::Element(e) => out.push(e),
            Child::Text(s) => out.push(Element::text(s)),
            Child::Int(n) => out.push(Element::text(n.to_string())),
            Child::Float(x) => out.push(Element::text(x.to_string())),
            Child::Bool(_) | Child::Null => {}
            Child::List(items) => flatten_children(items, out)?,
            Child::Failed(err) => return Err(err),
        }
    }
    Ok(())
}

/// Build an element from a tag or component, a prop list and children.
///
/// ```ignore
/// let el = h!("div", { "id" => "app" }, [
///     h!("button", { "onClick" => handler(|_| {}) }, ["+"]),
///     count,
/// ])?;
/// ```
#[macro_export]
macro_rules! h {
    ($kind:expr) => {
        $crate::h!($kind, {}, [])
    };
    ($kind:expr, { $($key:expr => $value:expr),* $(,)? }) => {
        $crate::h!($kind, { $($key => $value),* }, [])
    };
    ($kind:expr, { $($key:expr => $value:expr),* $(,)? }, [ $($child:expr),* $(,)? ]) => {
        $crate::element::create_element(
            $crate::element::IntoKind::into_kind($kind),
            $crate::props::Props::new()$(.with($key, $value))*,
            $crate::element::children([$($crate::element::Child::from($child)),*]),
        )
    };
}
