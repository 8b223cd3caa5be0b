//! # 目标定位模块
//!
//! ## 设计思路
//!
//! 宿主只告知“控件子树已挂载”，不直接指认目标输入框。
//! 定位器在子树内按固定顺序找出第一个可编辑文本控件，
//! 保证同一棵树的定位结果完全确定。
//!
//! ## 实现思路
//!
//! 先序深度优先：先看节点本身，再按布局顺序递归子节点，命中即返回。

use std::rc::Rc;

use crate::widget::{TextEditable, WidgetNode};

/// 在子树内定位第一个可编辑文本控件。
///
/// 遍历为先序深度优先（节点自身优先于子节点），首个命中者即为目标；
/// 子树内没有可编辑控件时返回 `None`。
pub fn find_text_editable(root: &Rc<dyn WidgetNode>) -> Option<Rc<dyn TextEditable>> {
    if let Some(editable) = root.as_text_editable() {
        return Some(editable);
    }
    for child in root.children() {
        if let Some(found) = find_text_editable(&child) {
            return Some(found);
        }
    }
    None
}
