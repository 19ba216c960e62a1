use num_derive::FromPrimitive;

/// Compositing rule of a channel. Blending itself belongs to the renderer;
/// the score only carries the number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum InkMode {
    Copy = 0,
    Transparent = 1,
    Reverse = 2,
    Ghost = 3,
    NotCopy = 4,
    NotTransparent = 5,
    NotReverse = 6,
    NotGhost = 7,
    Matte = 8,
    Mask = 9,
    Blend = 32,
    AddPin = 33,
    Add = 34,
    SubtractPin = 35,
    BackgroundTransparent = 36,
    Lightest = 37,
    Subtract = 38,
    Darkest = 39,
    Lighten = 40,
    Darken = 41,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum SpriteType {
    Inactive = 0,
    Bitmap = 1,
    Rectangle = 2,
    RoundRect = 3,
    Oval = 4,
    LineTopBottom = 5,
    LineBottomTop = 6,
    Text = 7,
    Button = 8,
    Checkbox = 9,
    RadioButton = 10,
    Undetermined = 16,
}
