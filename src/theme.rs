// Copyright 2020 The Druid Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Default visual parameters for the spinner.

#![allow(missing_docs)]

use piet::Color;

/// Default width and height of the widget.
pub const DEFAULT_SIZE: f64 = 40.0;

/// Default stroke thickness of the ring and indicator.
pub const DEFAULT_CIRCLE_THICKNESS: f64 = 5.0;

pub const DEFAULT_FOREGROUND: Color = Color::rgb8(0x00, 0x78, 0xd7);
pub const DEFAULT_BACKGROUND: Color = Color::rgb8(0x3c, 0x3c, 0x3c);
