use std::sync::Arc;

/// Ordered element properties. Order and duplicates are preserved.
pub type Props = Vec<(Arc<str>, String)>;

/// Abstract node produced by a render pass and consumed by the differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VNode {
    Element(VElement),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VElement {
    pub tag: Arc<str>,
    pub props: Props,
    pub children: Vec<VNode>,
    /// Identity used to match this node against an existing on-screen node.
    pub key: Option<Arc<str>>,
}

impl VElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: Arc::from(tag),
            props: Vec::new(),
            children: Vec::new(),
            key: None,
        }
    }

    pub fn prop(mut self, name: &str, value: impl Into<String>) -> Self {
        self.props.push((Arc::from(name), value.into()));
        self
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn keyed(mut self, key: Arc<str>) -> Self {
        self.key = Some(key);
        self
    }

    pub fn get_prop(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Same tag and same properties, ignoring children and key.
    pub fn same_shape(&self, other: &VElement) -> bool {
        self.tag == other.tag && self.props == other.props
    }
}

impl VNode {
    pub fn text(text: impl Into<String>) -> Self {
        VNode::Text(text.into())
    }

    pub fn key(&self) -> Option<&Arc<str>> {
        match self {
            VNode::Element(el) => el.key.as_ref(),
            VNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element(el) => &el.children,
            VNode::Text(_) => &[],
        }
    }

    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Element(el) => Some(el),
            VNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(text) => Some(text),
            VNode::Element(_) => None,
        }
    }
}

impl From<VElement> for VNode {
    fn from(el: VElement) -> Self {
        VNode::Element(el)
    }
}
