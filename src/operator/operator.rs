//! Running operator instances

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::types::{OperatorRegistry, OperatorResult, OperatorType, OperatorTypeFlags};
use crate::properties::OperatorProperties;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub level: ReportLevel,
    pub message: String,
}

/// Progress of a macro through its steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MacroState {
    /// Step currently running modal.
    pub current: Option<usize>,
    /// At least one step finished.
    pub finished_any: bool,
}

/// One call of an operator type, alive while it runs (longer when modal).
pub struct Operator {
    pub optype: Rc<OperatorType>,
    pub properties: OperatorProperties,
    /// Operator-private state kept between modal calls.
    pub customdata: Option<Box<dyn Any>>,
    pub reports: Vec<Report>,
    pub(crate) macro_ops: Vec<Operator>,
    pub(crate) macro_state: MacroState,
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("idname", &self.optype.idname)
            .field("properties", &self.properties)
            .field("customdata", &self.customdata.is_some())
            .field("reports", &self.reports)
            .field("macro_ops", &self.macro_ops)
            .finish()
    }
}

impl Operator {
    /// Create an instance; macro steps are instantiated from `registry`.
    pub fn new(
        optype: Rc<OperatorType>,
        properties: Option<&OperatorProperties>,
        registry: &OperatorRegistry,
    ) -> Self {
        let macro_ops = optype
            .macro_items
            .iter()
            .filter_map(|item| match registry.find(&item.idname) {
                Some(child) => Some(Operator::new(child, Some(&item.properties), registry)),
                None => {
                    tracing::error!(
                        "Macro '{}' uses unknown operator '{}'",
                        optype.idname,
                        item.idname
                    );
                    None
                }
            })
            .collect();

        Self {
            properties: properties.cloned().unwrap_or_default(),
            optype,
            customdata: None,
            reports: Vec::new(),
            macro_ops,
            macro_state: MacroState::default(),
        }
    }

    pub fn idname(&self) -> &str {
        &self.optype.idname
    }

    pub fn name(&self) -> &str {
        &self.optype.name
    }

    pub fn flags(&self) -> OperatorTypeFlags {
        self.optype.flags
    }

    pub fn is_macro(&self) -> bool {
        self.optype.is_macro()
    }

    /// Macro steps, in order.
    pub fn macro_ops(&self) -> &[Operator] {
        &self.macro_ops
    }

    /// Operator receiving modal events: the running macro step, or `self`.
    pub fn modal_target(&self) -> &Operator {
        self.macro_state
            .current
            .and_then(|i| self.macro_ops.get(i))
            .unwrap_or(self)
    }

    pub fn customdata<T: 'static>(&self) -> Option<&T> {
        self.customdata.as_ref()?.downcast_ref()
    }

    pub fn customdata_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.customdata.as_mut()?.downcast_mut()
    }

    pub fn set_customdata<T: 'static>(&mut self, data: T) {
        self.customdata = Some(Box::new(data));
    }

    pub fn report(&mut self, level: ReportLevel, message: impl Into<String>) {
        self.reports.push(Report {
            level,
            message: message.into(),
        });
    }

    /// Log and clear reports once the operator ended.
    pub(crate) fn flush_reports(&mut self, retval: OperatorResult) {
        for report in self.reports.drain(..) {
            match report.level {
                ReportLevel::Info => {
                    tracing::info!("{}: {}", self.optype.idname, report.message)
                }
                ReportLevel::Warning => {
                    tracing::warn!("{}: {}", self.optype.idname, report.message)
                }
                ReportLevel::Error => {
                    tracing::error!("{} ({:?}): {}", self.optype.idname, retval, report.message)
                }
            }
        }
    }
}
