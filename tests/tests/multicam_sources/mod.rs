mod resolution;
